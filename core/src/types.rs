//! Resource records exchanged with the API.
//!
//! # Design
//! Fields are optional or defaulted wherever the API may leave them out
//! (compact records carry little more than `gid` and `name`), and skipped
//! on serialization when empty so write requests only carry what was set.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// A workspace or organization.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Workspace {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// A project. Only the identifying fields are modeled.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

/// An account that can be given access to workspaces, projects and tasks.
///
/// The special id `me` refers to the authenticated user.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,
    /// Profile photo URLs keyed by size (`image_21x21`, ...).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<std::collections::BTreeMap<String, String>>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub workspaces: Vec<Workspace>,
}

/// Filter for a user's favorites. Both fields are required.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FavoritesQuery {
    /// `project`, `portfolio`, `tag`, `task`, `user` or `project_template`.
    pub resource_type: String,
    pub workspace: String,
}

impl FavoritesQuery {
    pub fn new(resource_type: impl Into<String>, workspace: impl Into<String>) -> Self {
        Self {
            resource_type: resource_type.into(),
            workspace: workspace.into(),
        }
    }
}

/// A sidebar favorite, in compact form.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Favorite {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Portfolio {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessLevel {
    Admin,
    Editor,
    Commenter,
    Viewer,
}

/// The team or user side of a membership.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMember {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMembership {
    pub gid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_type: String,
    #[serde(default)]
    pub parent: Option<Project>,
    #[serde(default)]
    pub member: Option<ProjectMember>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub access_level: Option<AccessLevel>,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub resource_subtype: String,
}

/// Input for adding a user or team to a project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateMembership {
    pub member: String,
    pub access_level: Option<AccessLevel>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldType {
    Text,
    Number,
    Enum,
    MultiEnum,
    Date,
    Boolean,
    People,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldFormat {
    Currency,
    Identifier,
    Percentage,
    Custom,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelPosition {
    Prefix,
    Suffix,
}

/// Name and color of an enum option.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumOption {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub name: String,
    /// Defaults to `none` server-side.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub color: String,
}

/// An enum option as stored by the API.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnumValue {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub gid: String,
    #[serde(flatten)]
    pub option: EnumOption,
    #[serde(default)]
    pub enabled: bool,
}

/// Definition fields shared by stored custom fields and create requests.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldBase {
    pub name: String,
    pub resource_subtype: FieldType,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<FieldFormat>,
    /// ISO 4217 code; only meaningful for the currency format.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_label_position: Option<LabelPosition>,
    /// Decimal places for number fields, 0 through 6.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precision: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_notifications_enabled: Option<bool>,
}

impl CustomFieldBase {
    pub fn new(name: impl Into<String>, resource_subtype: FieldType) -> Self {
        Self {
            name: name.into(),
            resource_subtype,
            description: String::new(),
            format: None,
            currency_code: None,
            custom_label: None,
            custom_label_position: None,
            precision: None,
            has_notifications_enabled: None,
        }
    }
}

/// Metadata for user-specified task fields. Locked fields reject edits
/// from other users with 403.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomField {
    pub gid: String,
    #[serde(flatten)]
    pub base: CustomFieldBase,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enum_options: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_global_to_workspace: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enabled: Option<bool>,
}

/// Value of a date custom field. `date_time` is only set when the value
/// carries a time of day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateValue {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
}

/// A custom field as it appears on a task, with its current value.
///
/// Only the value field matching the field's `resource_subtype` is set;
/// `display_value` is populated for every type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomFieldValue {
    #[serde(flatten)]
    pub field: CustomField,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub number_value: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub boolean_value: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_value: Option<DateValue>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enum_value: Option<EnumValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub multi_enum_values: Vec<EnumValue>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub people_value: Vec<User>,
}

/// Association between a custom field and a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomFieldSetting {
    pub gid: String,
    #[serde(default)]
    pub custom_field: Option<CustomField>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub project: Option<Project>,
    #[serde(default, rename = "is_important")]
    pub important: bool,
}

/// Input for creating a workspace-level custom field.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CreateCustomField {
    #[serde(flatten)]
    pub base: CustomFieldBase,
    pub workspace: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_options: Vec<EnumOption>,
}

/// Where to place a custom field among a project's existing settings.
///
/// `Unset` omits the key; `Null` sends an explicit JSON `null`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Placement {
    #[default]
    Unset,
    Null,
    Setting(String),
}

impl Placement {
    /// `""` is unset, `"-"` is an explicit null, anything else is a gid.
    pub fn parse(value: &str) -> Self {
        match value {
            "" => Placement::Unset,
            "-" => Placement::Null,
            gid => Placement::Setting(gid.to_string()),
        }
    }
}

/// Input for attaching an existing custom field to a project.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AddCustomFieldSetting {
    pub custom_field: String,
    pub important: bool,
    pub insert_before: Placement,
    pub insert_after: Placement,
}

/// A custom field definition created directly on a project.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProjectLocalCustomField {
    #[serde(flatten)]
    pub base: CustomFieldBase,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub enum_options: Vec<EnumOption>,
}

/// Input for creating a project-local custom field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddProjectLocalCustomField {
    pub custom_field: ProjectLocalCustomField,
    pub important: bool,
    pub insert_before: Placement,
    pub insert_after: Placement,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn compact_user_deserializes() {
        let user: User = serde_json::from_value(json!({"gid": "123", "name": "Ann"})).unwrap();
        assert_eq!(user.gid, "123");
        assert_eq!(user.name, "Ann");
        assert!(user.workspaces.is_empty());
        assert!(user.photo.is_none());
    }

    #[test]
    fn membership_deserializes_nested_records() {
        let membership: ProjectMembership = serde_json::from_value(json!({
            "gid": "12345",
            "resource_type": "membership",
            "parent": {"gid": "63627", "resource_type": "project", "name": "test"},
            "member": {"gid": "12345", "resource_type": "team", "name": "team1"},
            "access_level": "admin",
            "resource_subtype": "project_membership",
        }))
        .unwrap();
        assert_eq!(membership.parent.unwrap().name, "test");
        assert_eq!(membership.member.unwrap().resource_type, "team");
        assert_eq!(membership.access_level, Some(AccessLevel::Admin));
    }

    #[test]
    fn custom_field_flattens_base_fields() {
        let field: CustomField = serde_json::from_value(json!({
            "gid": "55",
            "name": "Priority",
            "resource_subtype": "enum",
            "enum_options": [
                {"gid": "1", "name": "High", "color": "red", "enabled": true}
            ],
            "is_global_to_workspace": true
        }))
        .unwrap();
        assert_eq!(field.base.name, "Priority");
        assert_eq!(field.base.resource_subtype, FieldType::Enum);
        assert_eq!(field.enum_options[0].option.color, "red");
        assert!(field.enum_options[0].enabled);
    }

    #[test]
    fn multi_enum_and_people_types_use_snake_case() {
        let t: FieldType = serde_json::from_value(json!("multi_enum")).unwrap();
        assert_eq!(t, FieldType::MultiEnum);
        assert_eq!(serde_json::to_value(FieldType::People).unwrap(), json!("people"));
    }

    #[test]
    fn create_custom_field_omits_unset_fields() {
        let mut base = CustomFieldBase::new("Cost", FieldType::Number);
        base.precision = Some(2);
        let req = CreateCustomField {
            base,
            workspace: "w1".to_string(),
            enum_options: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({
                "name": "Cost",
                "resource_subtype": "number",
                "precision": 2,
                "workspace": "w1"
            })
        );
    }

    #[test]
    fn custom_field_value_reads_enum_choice() {
        let value: CustomFieldValue = serde_json::from_value(json!({
            "gid": "55",
            "name": "Priority",
            "resource_subtype": "enum",
            "display_value": "High",
            "enum_value": {"gid": "1", "name": "High", "color": "red", "enabled": true},
            "number_value": null
        }))
        .unwrap();
        assert_eq!(value.field.base.name, "Priority");
        assert_eq!(value.display_value.as_deref(), Some("High"));
        assert_eq!(value.enum_value.unwrap().option.color, "red");
        assert!(value.number_value.is_none());
        assert!(value.multi_enum_values.is_empty());
    }

    #[test]
    fn custom_field_value_reads_date_and_people() {
        let value: CustomFieldValue = serde_json::from_value(json!({
            "gid": "56",
            "name": "Due",
            "resource_subtype": "date",
            "date_value": {"date": "2024-05-01", "date_time": "2024-05-01T09:30:00.000Z"},
            "people_value": [{"gid": "1", "name": "Ann"}]
        }))
        .unwrap();
        let date = value.date_value.unwrap();
        assert_eq!(date.date, NaiveDate::from_ymd_opt(2024, 5, 1));
        assert_eq!(
            date.date_time.unwrap().to_rfc3339(),
            "2024-05-01T09:30:00+00:00"
        );
        assert_eq!(value.people_value[0].name, "Ann");
    }

    #[test]
    fn number_value_serializes_alongside_field() {
        let mut field_base = CustomFieldBase::new("Estimate", FieldType::Number);
        field_base.precision = Some(1);
        let value = CustomFieldValue {
            field: CustomField {
                gid: "57".to_string(),
                base: field_base,
                enum_options: Vec::new(),
                is_global_to_workspace: None,
                enabled: None,
            },
            display_value: Some("2.5".to_string()),
            text_value: None,
            number_value: Some(2.5),
            boolean_value: None,
            date_value: None,
            enum_value: None,
            multi_enum_values: Vec::new(),
            people_value: Vec::new(),
        };
        assert_eq!(
            serde_json::to_value(&value).unwrap(),
            json!({
                "gid": "57",
                "name": "Estimate",
                "resource_subtype": "number",
                "precision": 1,
                "display_value": "2.5",
                "number_value": 2.5
            })
        );
    }

    #[test]
    fn placement_parse() {
        assert_eq!(Placement::parse(""), Placement::Unset);
        assert_eq!(Placement::parse("-"), Placement::Null);
        assert_eq!(Placement::parse("77"), Placement::Setting("77".to_string()));
    }
}
