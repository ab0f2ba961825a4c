//! `nxrm_user`
//!
//! Users are identified by `user_id` within a `source` realm; the import
//! identifier is `<user_id>,<source>`. The password is write-only: it is sent
//! on create, changed through the dedicated endpoint and never read back.

use async_trait::async_trait;
use nxrm_client::{ClientError, Result as ClientResult, UserApi};
use nxrm_core::{attrs, Attr, Attribute, Diagnostic, Diagnostics, Schema, Validator};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::context::ProviderContext;
use crate::descriptor::ResourceDescriptor;

/// Source of users managed by the server itself
pub const DEFAULT_SOURCE: &str = "default";

pub const USER_STATUSES: &[&str] = &["active", "locked", "disabled", "changepassword"];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct UserModel {
    pub user_id: Attr<String>,
    pub first_name: Attr<String>,
    pub last_name: Attr<String>,
    pub email: Attr<String>,
    pub password: Attr<String>,
    pub status: Attr<String>,
    pub source: Attr<String>,
    pub roles: Attr<Vec<String>>,
    pub read_only: Attr<bool>,
}

impl UserModel {
    fn source(&self) -> String {
        self.source.known_or(DEFAULT_SOURCE.to_string())
    }

    fn to_api(&self, with_password: bool) -> UserApi {
        UserApi {
            user_id: self.user_id.known_or(String::new()),
            first_name: self.first_name.known_or(String::new()),
            last_name: self.last_name.known_or(String::new()),
            email_address: self.email.known_or(String::new()),
            password: if with_password { self.password.to_option() } else { None },
            source: self.source(),
            status: self.status.known_or("active".to_string()),
            read_only: self.read_only.known_or(false),
            roles: self.roles.known_or(Vec::new()),
            external_roles: Vec::new(),
        }
    }
}

/// Split an import identifier into user id and source
pub fn parse_import_id(id: &str) -> Result<(String, String), Diagnostic> {
    let invalid = || {
        Diagnostic::error(
            "Invalid import identifier",
            format!(
                "Expected \"<user_id>,<source>\" or \"<user_id>\", got \"{}\".",
                id
            ),
        )
    };
    let mut parts = id.split(',').map(str::trim);
    let user_id = parts.next().filter(|s| !s.is_empty()).ok_or_else(invalid)?;
    let source = match parts.next() {
        Some(s) if !s.is_empty() => s,
        Some(_) => return Err(invalid()),
        None => DEFAULT_SOURCE,
    };
    if parts.next().is_some() {
        return Err(invalid());
    }
    Ok((user_id.to_string(), source.to_string()))
}

#[derive(Debug, Clone, Copy, Default)]
pub struct UserDescriptor;

#[async_trait]
impl ResourceDescriptor for UserDescriptor {
    type Model = UserModel;
    type Api = UserApi;

    fn type_name(&self) -> String {
        "nxrm_user".to_string()
    }

    fn noun(&self) -> String {
        "User".to_string()
    }

    fn schema(&self) -> Schema {
        Schema::new(
            "A user account.",
            attrs([
                (
                    "user_id",
                    Attribute::required_string()
                        .requires_replace()
                        .validate(Validator::LengthAtLeast(1)),
                ),
                ("first_name", Attribute::required_string()),
                ("last_name", Attribute::required_string()),
                ("email", Attribute::required_string()),
                (
                    "password",
                    Attribute::optional_string()
                        .sensitive()
                        .describe("Initial password; later changes use the change-password endpoint"),
                ),
                (
                    "status",
                    Attribute::optional_string()
                        .default_value(json!("active"))
                        .validate(Validator::one_of(USER_STATUSES)),
                ),
                (
                    "source",
                    Attribute::optional_string()
                        .default_value(json!(DEFAULT_SOURCE))
                        .requires_replace(),
                ),
                ("roles", Attribute::optional(Attribute::string_set())),
                (
                    "read_only",
                    Attribute::computed(nxrm_core::AttributeType::Bool).use_state_for_unknown(),
                ),
            ]),
        )
    }

    fn identifier_attribute(&self) -> &'static str {
        "user_id"
    }

    fn identifier(&self, model: &UserModel) -> Option<String> {
        model.user_id.to_option()
    }

    fn set_identifier(&self, model: &mut UserModel, id: String) {
        model.user_id = Attr::Known(id);
    }

    fn validate(&self, plan: &UserModel) -> Diagnostics {
        let mut diags = Diagnostics::new();
        if plan.source() == DEFAULT_SOURCE && plan.password.is_null() {
            diags.push(
                Diagnostic::error(
                    "Missing required argument",
                    "password is required for users of the default source.",
                )
                .at("password"),
            );
        }
        diags
    }

    async fn do_create(&self, ctx: &ProviderContext, plan: &UserModel) -> ClientResult<Option<String>> {
        ctx.client().create_user(&plan.to_api(true)).await?;
        Ok(None)
    }

    async fn do_read(&self, ctx: &ProviderContext, state: &UserModel) -> ClientResult<UserApi> {
        let user_id = state.user_id.known_or(String::new());
        let source = state.source();
        ctx.client()
            .find_user(&user_id, &source)
            .await?
            .ok_or_else(|| ClientError::not_found(format!("user {} not found in source {}", user_id, source)))
    }

    async fn do_update(&self, ctx: &ProviderContext, plan: &UserModel, state: &UserModel) -> ClientResult<()> {
        let user_id = state.user_id.known_or(String::new());
        ctx.client().update_user(&user_id, &plan.to_api(false)).await?;
        if let Some(password) = plan.password.value() {
            if state.password.value() != Some(password) {
                tracing::info!(user_id = %user_id, "changing password");
                ctx.client().change_password(&user_id, password).await?;
            }
        }
        Ok(())
    }

    async fn do_delete(&self, ctx: &ProviderContext, state: &UserModel) -> ClientResult<()> {
        let source = state.source();
        let realm = (source != DEFAULT_SOURCE).then_some(source.as_str());
        ctx.client()
            .delete_user(&state.user_id.known_or(String::new()), realm)
            .await
    }

    fn import_model(&self, id: &str) -> Result<UserModel, Diagnostic> {
        let (user_id, source) = parse_import_id(id)?;
        Ok(UserModel {
            user_id: Attr::Known(user_id),
            source: Attr::Known(source),
            ..Default::default()
        })
    }

    fn update_state_from_api(&self, state: &mut UserModel, api: UserApi) -> Diagnostics {
        state.user_id = Attr::Known(api.user_id);
        state.first_name = Attr::Known(api.first_name);
        state.last_name = Attr::Known(api.last_name);
        state.email = Attr::Known(api.email_address);
        state.status = Attr::Known(api.status);
        if !api.source.is_empty() {
            state.source = Attr::Known(api.source);
        }
        state.roles = state.roles.observe_set(api.roles);
        state.read_only = Attr::Known(api.read_only);
        Diagnostics::new()
    }

    fn map_missing_from_plan(&self, state: &mut UserModel, plan: &UserModel) {
        state.password.fill_from(&plan.password);
    }
}
