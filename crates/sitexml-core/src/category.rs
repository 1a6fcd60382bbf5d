//! Category resolution
//!
//! A feature's category is either fixed for the whole run, or inferred from the
//! repository metadata: the first category unit (in document order) whose
//! requirements include `<feature id>.feature.group`.

use tracing::debug;

use crate::metadata::MetadataDocument;
use crate::xml::AttrEq;

const REQUIRED_PATH: &str = "repository/units/unit/requires/required";
const PROPERTY_PATH: &str = "properties/property";
const FEATURE_GROUP_SUFFIX: &str = ".feature.group";
const TYPE_CATEGORY: &str = "org.eclipse.equinox.p2.type.category";
const NAME_PROPERTY: &str = "org.eclipse.equinox.p2.name";

/// How features get their category for a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryStrategy {
    /// Every feature goes into this category; metadata is never consulted
    Fixed(String),
    /// Look each feature up in the repository metadata
    Inferred,
}

impl CategoryStrategy {
    /// An empty override means "infer"; any other name is used verbatim
    pub fn from_override(category: Option<&str>) -> Self {
        match category {
            Some(name) if !name.is_empty() => Self::Fixed(name.to_string()),
            _ => Self::Inferred,
        }
    }

    pub fn fixed_name(&self) -> Option<&str> {
        match self {
            Self::Fixed(name) => Some(name),
            Self::Inferred => None,
        }
    }

    pub fn category_for(&self, metadata: &MetadataDocument, feature_id: &str) -> Option<String> {
        match self {
            Self::Fixed(name) => Some(name.clone()),
            Self::Inferred => resolve_category(metadata, feature_id),
        }
    }
}

/// Find the category that requires `<feature_id>.feature.group`, if any
pub fn resolve_category(metadata: &MetadataDocument, feature_id: &str) -> Option<String> {
    let group = format!("{}{}", feature_id, FEATURE_GROUP_SUFFIX);
    let matches = metadata
        .document()
        .select(REQUIRED_PATH, Some(AttrEq::new("name", &group)));

    for required in matches {
        // required -> requires -> unit
        let Some(unit) = required.ancestor(2) else {
            continue;
        };

        let is_category = unit
            .find(PROPERTY_PATH, Some(AttrEq::new("name", TYPE_CATEGORY)))
            .and_then(|p| p.attribute("value"))
            == Some("true");
        if !is_category {
            continue;
        }

        match unit
            .find(PROPERTY_PATH, Some(AttrEq::new("name", NAME_PROPERTY)))
            .and_then(|p| p.attribute("value"))
        {
            Some(name) => {
                debug!(feature = feature_id, category = name, "Resolved category");
                return Some(name.to_string());
            }
            None => {
                debug!(
                    feature = feature_id,
                    unit = unit.attribute("id").unwrap_or_default(),
                    "Category unit has no name property, skipping"
                );
            }
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::MetadataSource;
    use crate::xml::Document;

    fn metadata(units: &str) -> MetadataDocument {
        let xml = format!(
            "<?xml version='1.0' encoding='UTF-8'?>\n<repository name='test'>\n<units>{}</units>\n</repository>",
            units
        );
        MetadataDocument::from_document(
            Document::parse(xml.as_bytes()).unwrap(),
            MetadataSource::ContentXml,
        )
    }

    fn category_unit(id: &str, name: &str, requires: &[&str]) -> String {
        let required: String = requires
            .iter()
            .map(|r| format!("<required namespace='org.eclipse.equinox.p2.iu' name='{}' range='0.0.0'/>", r))
            .collect();
        format!(
            "<unit id='{id}' version='1.0.0'>
               <properties size='2'>
                 <property name='org.eclipse.equinox.p2.name' value='{name}'/>
                 <property name='org.eclipse.equinox.p2.type.category' value='true'/>
               </properties>
               <requires size='{n}'>{required}</requires>
             </unit>",
            n = requires.len()
        )
    }

    #[test]
    fn resolves_category_requiring_feature_group() {
        let md = metadata(&category_unit("tools.cat", "Tools", &["featureA.feature.group"]));
        assert_eq!(resolve_category(&md, "featureA").as_deref(), Some("Tools"));
    }

    #[test]
    fn no_match_is_none() {
        let md = metadata(&category_unit("tools.cat", "Tools", &["featureB.feature.group"]));
        assert!(resolve_category(&md, "featureA").is_none());
    }

    #[test]
    fn bare_feature_id_does_not_match() {
        let md = metadata(&category_unit("tools.cat", "Tools", &["featureA"]));
        assert!(resolve_category(&md, "featureA").is_none());
    }

    #[test]
    fn non_category_requirers_are_skipped() {
        let units = format!(
            "<unit id='product' version='1.0.0'>
               <properties><property name='org.eclipse.equinox.p2.name' value='Product'/></properties>
               <requires><required name='featureA.feature.group'/></requires>
             </unit>
             <unit id='flagged.false' version='1.0.0'>
               <properties>
                 <property name='org.eclipse.equinox.p2.name' value='NotACategory'/>
                 <property name='org.eclipse.equinox.p2.type.category' value='false'/>
               </properties>
               <requires><required name='featureA.feature.group'/></requires>
             </unit>
             {}",
            category_unit("tools.cat", "Tools", &["featureA.feature.group"])
        );
        let md = metadata(&units);
        assert_eq!(resolve_category(&md, "featureA").as_deref(), Some("Tools"));
    }

    #[test]
    fn first_category_in_document_order_wins() {
        let units = format!(
            "{}{}",
            category_unit("first.cat", "First", &["featureA.feature.group"]),
            category_unit("second.cat", "Second", &["featureA.feature.group"])
        );
        let md = metadata(&units);
        assert_eq!(resolve_category(&md, "featureA").as_deref(), Some("First"));
    }

    #[test]
    fn unnamed_category_is_skipped() {
        let units = format!(
            "<unit id='unnamed.cat' version='1.0.0'>
               <properties><property name='org.eclipse.equinox.p2.type.category' value='true'/></properties>
               <requires><required name='featureA.feature.group'/></requires>
             </unit>{}",
            category_unit("named.cat", "Named", &["featureA.feature.group"])
        );
        let md = metadata(&units);
        assert_eq!(resolve_category(&md, "featureA").as_deref(), Some("Named"));
    }

    #[test]
    fn requirements_outside_units_path_are_ignored() {
        let xml = "<repository><references><requires><required name='featureA.feature.group'/></requires></references></repository>";
        let md = MetadataDocument::from_document(
            Document::parse(xml.as_bytes()).unwrap(),
            MetadataSource::ContentXml,
        );
        assert!(resolve_category(&md, "featureA").is_none());
    }

    #[test]
    fn empty_metadata_resolves_nothing() {
        assert!(resolve_category(&MetadataDocument::empty(), "featureA").is_none());
    }

    #[test]
    fn fixed_strategy_ignores_metadata() {
        let md = metadata(&category_unit("tools.cat", "Tools", &["featureA.feature.group"]));
        let strategy = CategoryStrategy::from_override(Some("Main"));
        assert_eq!(strategy.category_for(&md, "featureA").as_deref(), Some("Main"));
        assert_eq!(strategy.fixed_name(), Some("Main"));
    }

    #[test]
    fn empty_override_means_inferred() {
        assert_eq!(CategoryStrategy::from_override(None), CategoryStrategy::Inferred);
        assert_eq!(CategoryStrategy::from_override(Some("")), CategoryStrategy::Inferred);
    }

    #[test]
    fn override_name_is_kept_verbatim() {
        assert_eq!(
            CategoryStrategy::from_override(Some("Main ")),
            CategoryStrategy::Fixed("Main ".to_string())
        );
        assert_eq!(
            CategoryStrategy::from_override(Some("  ")),
            CategoryStrategy::Fixed("  ".to_string())
        );
    }
}
