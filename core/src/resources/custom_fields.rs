use serde_json::{Map, Value};
use tracing::debug;

use crate::client::AsanaClient;
use crate::error::{Result, TransportError};
use crate::options::Options;
use crate::pagination::Page;
use crate::transport::Transport;
use crate::types::{
    AddCustomFieldSetting, AddProjectLocalCustomField, CreateCustomField, CustomField,
    CustomFieldSetting, Placement,
};

/// Body for `addCustomFieldSetting`, where placement keys are either omitted,
/// explicitly null, or a setting gid.
fn setting_body(custom_field: Value, important: bool, before: &Placement, after: &Placement) -> Value {
    let mut body = Map::new();
    body.insert("custom_field".to_string(), custom_field);
    body.insert("is_important".to_string(), Value::Bool(important));
    for (key, placement) in [("insert_before", before), ("insert_after", after)] {
        match placement {
            Placement::Unset => {}
            Placement::Null => {
                body.insert(key.to_string(), Value::Null);
            }
            Placement::Setting(gid) => {
                body.insert(key.to_string(), Value::String(gid.clone()));
            }
        }
    }
    Value::Object(body)
}

impl<T: Transport> AsanaClient<T> {
    pub fn custom_field(&self, gid: &str, options: &Options) -> Result<CustomField> {
        debug!(custom_field = gid, "loading custom field");
        self.get(&format!("/custom_fields/{gid}"), options)
    }

    /// One page of the custom fields defined in a workspace.
    pub fn workspace_custom_fields(
        &self,
        workspace: &str,
        options: &Options,
    ) -> Result<Page<CustomField>> {
        debug!(workspace, "listing custom fields");
        self.get_page(&format!("/workspaces/{workspace}/custom_fields"), options)
    }

    pub fn all_workspace_custom_fields(
        &self,
        workspace: &str,
        options: &Options,
    ) -> Result<Vec<CustomField>> {
        debug!(workspace, "listing all custom fields");
        self.get_all(&format!("/workspaces/{workspace}/custom_fields"), options)
    }

    pub fn create_custom_field(&self, request: &CreateCustomField) -> Result<CustomField> {
        debug!(
            name = %request.base.name,
            workspace = %request.workspace,
            "creating custom field"
        );
        self.post("/custom_fields", request)
    }

    /// Attach an existing custom field to a project.
    pub fn add_custom_field_setting(
        &self,
        project: &str,
        request: &AddCustomFieldSetting,
    ) -> Result<CustomFieldSetting> {
        debug!(custom_field = %request.custom_field, project, "attaching custom field");
        let body = setting_body(
            Value::String(request.custom_field.clone()),
            request.important,
            &request.insert_before,
            &request.insert_after,
        );
        self.post(&format!("/projects/{project}/addCustomFieldSetting"), &body)
    }

    /// Create a custom field that only exists on `project`.
    pub fn add_project_local_custom_field(
        &self,
        project: &str,
        request: &AddProjectLocalCustomField,
    ) -> Result<CustomFieldSetting> {
        debug!(
            name = %request.custom_field.base.name,
            project,
            "creating project-local custom field"
        );
        let field = serde_json::to_value(&request.custom_field).map_err(TransportError::Encode)?;
        let body = setting_body(
            field,
            request.important,
            &request.insert_before,
            &request.insert_after,
        );
        self.post(&format!("/projects/{project}/addCustomFieldSetting"), &body)
    }

    /// The custom fields attached to a project, in display order.
    pub fn project_custom_field_settings(
        &self,
        project: &str,
        options: &Options,
    ) -> Result<Vec<CustomFieldSetting>> {
        debug!(project, "listing custom field settings");
        self.get_all(&format!("/projects/{project}/custom_field_settings"), options)
    }

    pub fn remove_custom_field_setting(&self, project: &str, custom_field: &str) -> Result<()> {
        debug!(custom_field, project, "detaching custom field");
        let body = serde_json::json!({ "custom_field": custom_field });
        self.post_empty(&format!("/projects/{project}/removeCustomFieldSetting"), &body)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::config::ClientConfig;
    use crate::mock::MockTransport;
    use crate::types::{CustomFieldBase, EnumOption, FieldType, ProjectLocalCustomField};

    fn client(mock: MockTransport) -> AsanaClient<MockTransport> {
        AsanaClient::with_transport(mock, ClientConfig::default())
    }

    fn setting_response() -> Value {
        json!({"gid": "s1", "is_important": true, "custom_field": {"gid": "cf1", "name": "Priority", "resource_subtype": "enum"}})
    }

    fn sent_data(c: &AsanaClient<MockTransport>) -> Value {
        c.transport().last_request().unwrap().body().unwrap().unwrap()["data"].clone()
    }

    #[test]
    fn workspace_custom_fields_uses_nested_path() {
        let c = client(MockTransport::new(200, json!([{"gid": "cf1", "name": "Stage", "resource_subtype": "text"}])));
        let page = c.workspace_custom_fields("w9", &Options::new()).unwrap();
        assert_eq!(page.items[0].base.resource_subtype, FieldType::Text);
        assert_eq!(c.transport().last_request().unwrap().path(), "/api/1.0/workspaces/w9/custom_fields");
    }

    #[test]
    fn add_setting_omits_unset_placement() {
        let c = client(MockTransport::new(200, setting_response()));
        let request = AddCustomFieldSetting {
            custom_field: "cf1".to_string(),
            important: true,
            ..Default::default()
        };
        let setting = c.add_custom_field_setting("p1", &request).unwrap();
        assert!(setting.important);
        assert_eq!(setting.custom_field.unwrap().gid, "cf1");
        assert_eq!(
            c.transport().last_request().unwrap().path(),
            "/api/1.0/projects/p1/addCustomFieldSetting"
        );
        assert_eq!(sent_data(&c), json!({"custom_field": "cf1", "is_important": true}));
    }

    #[test]
    fn add_setting_sends_explicit_null_and_gid() {
        let c = client(MockTransport::new(200, setting_response()));
        let request = AddCustomFieldSetting {
            custom_field: "cf1".to_string(),
            important: false,
            insert_before: Placement::parse("-"),
            insert_after: Placement::parse("s0"),
        };
        c.add_custom_field_setting("p1", &request).unwrap();
        let data = sent_data(&c);
        assert_eq!(data["insert_after"], "s0");
        assert!(data.as_object().unwrap().contains_key("insert_before"));
        assert!(data["insert_before"].is_null());
    }

    #[test]
    fn project_local_field_sends_definition() {
        let c = client(MockTransport::new(200, setting_response()));
        let request = AddProjectLocalCustomField {
            custom_field: ProjectLocalCustomField {
                base: CustomFieldBase::new("Priority", FieldType::Enum),
                enum_options: vec![EnumOption {
                    name: "High".to_string(),
                    color: "red".to_string(),
                }],
            },
            important: true,
            insert_before: Placement::Unset,
            insert_after: Placement::Unset,
        };
        c.add_project_local_custom_field("p1", &request).unwrap();
        let data = sent_data(&c);
        assert_eq!(data["custom_field"]["name"], "Priority");
        assert_eq!(data["custom_field"]["enum_options"][0]["color"], "red");
    }

    #[test]
    fn remove_setting_ignores_response_data() {
        let c = client(MockTransport::new(200, json!({})));
        c.remove_custom_field_setting("p1", "cf1").unwrap();
        assert_eq!(sent_data(&c), json!({"custom_field": "cf1"}));
    }

    #[test]
    fn locked_field_edit_is_fatal() {
        let c = client(MockTransport::new(
            403,
            r#"{"errors":[{"message":"Custom field is locked"}]}"#,
        ));
        let err = c.remove_custom_field_setting("p1", "cf1").unwrap_err();
        assert!(err.is_fatal());
        assert_eq!(err.api_error().unwrap().message, "Custom field is locked");
    }
}
