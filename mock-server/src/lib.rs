//! In-memory fake of the Asana endpoints used by `asana-core`.
//!
//! Routes live under `/api/1.0` and answer with the API's envelopes:
//! `{"data": ...}` for records, `{"data": [...], "next_page": ...}` for
//! lists, and `{"errors": [{"message", "help"}]}` for failures.

pub mod store;

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::RwLock};
use tower_http::trace::TraceLayer;

pub use store::{
    Compact, CustomField, CustomFieldSetting, EnumOption, Membership, Portfolio, Store, User, ME,
    PROJECT, SEEDED_USERS, TEAM, WORKSPACE,
};

pub type Db = Arc<RwLock<Store>>;

/// Largest page the API hands out.
pub const MAX_LIMIT: u32 = 100;

const ERRORS_HELP: &str = "For more information on API status codes and how to handle them, \
                           read the docs on errors: https://developers.asana.com/docs/errors";

pub fn app() -> Router {
    app_with(Store::seeded())
}

pub fn app_with(store: Store) -> Router {
    let db: Db = Arc::new(RwLock::new(store));
    let api = Router::new()
        .route("/users", get(list_users))
        .route("/users/{gid}", get(get_user))
        .route("/users/{gid}/favorites", get(list_favorites))
        .route("/portfolios", get(list_portfolios))
        .route("/memberships", get(list_memberships).post(create_membership))
        .route("/custom_fields", post(create_custom_field))
        .route("/custom_fields/{gid}", get(get_custom_field))
        .route("/workspaces/{gid}/custom_fields", get(list_workspace_custom_fields))
        .route("/projects/{gid}/custom_field_settings", get(list_settings))
        .route("/projects/{gid}/addCustomFieldSetting", post(add_setting))
        .route("/projects/{gid}/removeCustomFieldSetting", post(remove_setting));
    Router::new()
        .nest("/api/1.0", api)
        .layer(TraceLayer::new_for_http())
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

/// An error answered in the API's `{"errors": [...]}` shape.
#[derive(Debug)]
pub struct Failure {
    status: StatusCode,
    message: String,
}

impl Failure {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    fn unknown(kind: &str, gid: &str) -> Self {
        Self::new(StatusCode::NOT_FOUND, format!("{kind}: Unknown object: {gid}"))
    }
}

impl IntoResponse for Failure {
    fn into_response(self) -> Response {
        let body = json!({
            "errors": [{ "message": self.message, "help": ERRORS_HELP }]
        });
        (self.status, Json(body)).into_response()
    }
}

type ApiResult = Result<Json<Value>, Failure>;

#[derive(Deserialize)]
pub struct Body<T> {
    pub data: T,
}

/// Query parameters accepted by the list endpoints. `opt_fields` and
/// `opt_pretty` are accepted and ignored.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub workspace: Option<String>,
    pub owner: Option<String>,
    pub parent: Option<String>,
    pub resource_type: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<String>,
}

fn data<T: Serialize>(value: T) -> Json<Value> {
    Json(json!({ "data": value }))
}

/// Slice one page out of `items`. Offsets are the decimal index of the
/// first item of the page.
fn paginate<T: Serialize>(items: &[T], query: &ListQuery, path: &str) -> ApiResult {
    let limit = query.limit.unwrap_or(MAX_LIMIT);
    if limit == 0 || limit > MAX_LIMIT {
        return Err(Failure::bad_request(format!(
            "limit: Must be between 1 and {MAX_LIMIT}"
        )));
    }
    let start = match &query.offset {
        Some(offset) => offset
            .parse::<usize>()
            .ok()
            .filter(|start| *start <= items.len())
            .ok_or_else(|| Failure::bad_request("offset: Your pagination token is invalid"))?,
        None => 0,
    };
    let end = (start + limit as usize).min(items.len());
    let next_page = (end < items.len()).then(|| {
        json!({
            "offset": end.to_string(),
            "path": format!("{path}?limit={limit}&offset={end}"),
            "uri": format!("https://app.asana.com/api/1.0{path}?limit={limit}&offset={end}"),
        })
    });
    Ok(Json(json!({ "data": &items[start..end], "next_page": next_page })))
}

fn required<'a>(value: &'a Option<String>, name: &str) -> Result<&'a str, Failure> {
    value
        .as_deref()
        .ok_or_else(|| Failure::bad_request(format!("{name}: Missing input")))
}

async fn get_user(State(db): State<Db>, Path(gid): Path<String>) -> ApiResult {
    let store = db.read().await;
    store
        .user(&gid)
        .map(data)
        .ok_or_else(|| Failure::unknown("user", &gid))
}

async fn list_users(State(db): State<Db>, Query(query): Query<ListQuery>) -> ApiResult {
    let workspace = required(&query.workspace, "workspace")?;
    let store = db.read().await;
    let users: Vec<Value> = store
        .users
        .iter()
        .filter(|u| u.workspaces.iter().any(|w| w.gid == workspace))
        .map(|u| json!({ "gid": u.gid, "resource_type": "user", "name": u.name }))
        .collect();
    paginate(&users, &query, "/users")
}

async fn list_favorites(
    State(db): State<Db>,
    Path(gid): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    let resource_type = required(&query.resource_type, "resource_type")?;
    let workspace = required(&query.workspace, "workspace")?;
    let store = db.read().await;
    let user = store
        .user(&gid)
        .ok_or_else(|| Failure::unknown("user", &gid))?;
    // Only the authenticated user's favorites are visible.
    let favorites: Vec<&Compact> = if user.gid == ME && workspace == WORKSPACE {
        store
            .favorites
            .iter()
            .filter(|f| f.resource_type == resource_type)
            .collect()
    } else {
        Vec::new()
    };
    paginate(&favorites, &query, &format!("/users/{gid}/favorites"))
}

async fn list_portfolios(State(db): State<Db>, Query(query): Query<ListQuery>) -> ApiResult {
    let workspace = required(&query.workspace, "workspace")?;
    let owner = required(&query.owner, "owner")?;
    let owner = if owner == "me" { ME } else { owner };
    let store = db.read().await;
    let portfolios: Vec<&Portfolio> = store
        .portfolios
        .iter()
        .filter(|p| p.workspace == workspace && p.owner == owner)
        .collect();
    paginate(&portfolios, &query, "/portfolios")
}

async fn list_memberships(State(db): State<Db>, Query(query): Query<ListQuery>) -> ApiResult {
    let parent = required(&query.parent, "parent")?;
    let store = db.read().await;
    let memberships: Vec<&Membership> = store
        .memberships
        .iter()
        .filter(|m| m.parent.gid == parent)
        .collect();
    paginate(&memberships, &query, "/memberships")
}

#[derive(Deserialize)]
pub struct NewMembership {
    pub member: String,
    pub parent: String,
    pub access_level: Option<String>,
}

async fn create_membership(
    State(db): State<Db>,
    Json(body): Json<Body<NewMembership>>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let input = body.data;
    let mut store = db.write().await;
    let parent = store
        .project(&input.parent)
        .cloned()
        .ok_or_else(|| Failure::unknown("parent", &input.parent))?;
    let member = store
        .member(&input.member)
        .ok_or_else(|| Failure::unknown("member", &input.member))?;
    let access_level = input.access_level.unwrap_or_else(|| "editor".to_string());
    if !["admin", "editor", "commenter", "viewer"].contains(&access_level.as_str()) {
        return Err(Failure::bad_request(format!(
            "access_level: Not a valid enum value: {access_level}"
        )));
    }
    let membership = Membership {
        gid: store.next_gid(),
        resource_type: "membership".to_string(),
        parent,
        member,
        access_level,
        resource_subtype: "project_membership".to_string(),
    };
    store.memberships.push(membership.clone());
    Ok((StatusCode::CREATED, data(membership)))
}

#[derive(Deserialize)]
pub struct NewEnumOption {
    pub name: String,
    #[serde(default)]
    pub color: Option<String>,
}

#[derive(Deserialize)]
pub struct NewCustomField {
    pub name: String,
    pub resource_subtype: String,
    #[serde(default)]
    pub description: String,
    pub precision: Option<u8>,
    #[serde(default)]
    pub enum_options: Vec<NewEnumOption>,
    pub workspace: Option<String>,
}

impl NewCustomField {
    fn build(self, store: &mut Store, workspace: Option<String>) -> Result<CustomField, Failure> {
        if self.precision.is_some_and(|p| p > 6) {
            return Err(Failure::bad_request("precision: Must be between 0 and 6"));
        }
        let enum_options = self
            .enum_options
            .into_iter()
            .map(|option| EnumOption {
                gid: store.next_gid(),
                name: option.name,
                color: option.color.unwrap_or_else(|| "none".to_string()),
                enabled: true,
            })
            .collect();
        Ok(CustomField {
            gid: store.next_gid(),
            name: self.name,
            resource_subtype: self.resource_subtype,
            description: self.description,
            precision: self.precision,
            enum_options,
            is_global_to_workspace: workspace.is_some(),
            workspace,
        })
    }
}

async fn create_custom_field(
    State(db): State<Db>,
    Json(body): Json<Body<NewCustomField>>,
) -> Result<(StatusCode, Json<Value>), Failure> {
    let input = body.data;
    let workspace = required(&input.workspace, "workspace")?.to_string();
    let mut store = db.write().await;
    let field = input.build(&mut store, Some(workspace))?;
    store.custom_fields.push(field.clone());
    Ok((StatusCode::CREATED, data(field)))
}

async fn get_custom_field(State(db): State<Db>, Path(gid): Path<String>) -> ApiResult {
    let store = db.read().await;
    store
        .custom_field(&gid)
        .map(data)
        .ok_or_else(|| Failure::unknown("custom_field", &gid))
}

async fn list_workspace_custom_fields(
    State(db): State<Db>,
    Path(gid): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    let store = db.read().await;
    let fields: Vec<&CustomField> = store
        .custom_fields
        .iter()
        .filter(|f| f.workspace.as_deref() == Some(gid.as_str()))
        .collect();
    paginate(&fields, &query, &format!("/workspaces/{gid}/custom_fields"))
}

async fn list_settings(
    State(db): State<Db>,
    Path(gid): Path<String>,
    Query(query): Query<ListQuery>,
) -> ApiResult {
    let store = db.read().await;
    if store.project(&gid).is_none() {
        return Err(Failure::unknown("project", &gid));
    }
    let settings = store.settings.get(&gid).map(Vec::as_slice).unwrap_or_default();
    paginate(settings, &query, &format!("/projects/{gid}/custom_field_settings"))
}

#[derive(Deserialize)]
pub struct NewSetting {
    /// A custom field gid, or a definition for a project-local field.
    pub custom_field: Value,
    #[serde(default)]
    pub is_important: bool,
    pub insert_before: Option<String>,
    pub insert_after: Option<String>,
}

async fn add_setting(
    State(db): State<Db>,
    Path(gid): Path<String>,
    Json(body): Json<Body<NewSetting>>,
) -> ApiResult {
    let input = body.data;
    if input.insert_before.is_some() && input.insert_after.is_some() {
        return Err(Failure::bad_request(
            "Cannot specify both insert_before and insert_after",
        ));
    }

    let mut store = db.write().await;
    let project = store
        .project(&gid)
        .cloned()
        .ok_or_else(|| Failure::unknown("project", &gid))?;

    let custom_field = match input.custom_field {
        Value::String(field_gid) => store
            .custom_field(&field_gid)
            .cloned()
            .ok_or_else(|| Failure::unknown("custom_field", &field_gid))?,
        definition @ Value::Object(_) => {
            let definition: NewCustomField = serde_json::from_value(definition)
                .map_err(|e| Failure::bad_request(format!("custom_field: {e}")))?;
            let field = definition.build(&mut store, None)?;
            store.custom_fields.push(field.clone());
            field
        }
        _ => return Err(Failure::bad_request("custom_field: Missing input")),
    };

    let setting = CustomFieldSetting {
        gid: store.next_gid(),
        custom_field,
        project,
        is_important: input.is_important,
    };
    let settings = store.settings.entry(gid).or_default();
    if settings
        .iter()
        .any(|s| s.custom_field.gid == setting.custom_field.gid)
    {
        return Err(Failure::bad_request(
            "custom_field: Custom field already on project",
        ));
    }
    let anchor = |target: &str| settings.iter().position(|s| s.gid == target);
    let index = match (&input.insert_before, &input.insert_after) {
        (Some(before), None) => {
            anchor(before.as_str()).ok_or_else(|| Failure::unknown("insert_before", before))?
        }
        (None, Some(after)) => {
            anchor(after.as_str()).ok_or_else(|| Failure::unknown("insert_after", after))? + 1
        }
        _ => settings.len(),
    };
    settings.insert(index, setting.clone());
    Ok(data(setting))
}

#[derive(Deserialize)]
pub struct RemovedSetting {
    pub custom_field: String,
}

async fn remove_setting(
    State(db): State<Db>,
    Path(gid): Path<String>,
    Json(body): Json<Body<RemovedSetting>>,
) -> ApiResult {
    let field_gid = body.data.custom_field;
    let mut store = db.write().await;
    if store.project(&gid).is_none() {
        return Err(Failure::unknown("project", &gid));
    }
    let settings = store.settings.entry(gid).or_default();
    let before = settings.len();
    settings.retain(|s| s.custom_field.gid != field_gid);
    if settings.len() == before {
        return Err(Failure::bad_request(format!(
            "custom_field: Not on project: {field_gid}"
        )));
    }
    Ok(data(json!({})))
}
