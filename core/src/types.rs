//! Request payloads and response bodies for the marketplace API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently.
//! Integration tests catch any schema drift between the two crates.
//! Optional payload fields are skipped when unset so the server applies its
//! own defaults.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Payload carrying a public SSH key, used by attach and key creation.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SshKey {
    pub ssh_key: String,
}

/// Payload for renting an ask (`PUT /asks/{id}/`).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateInstance {
    pub client_id: String,
    pub image: String,
    pub env: BTreeMap<String, String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub price: Option<f64>,
    pub disk: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extra: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub onstart: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_login: Option<String>,
    pub python_utf8: bool,
    pub lang_utf8: bool,
    pub use_jupyter_lab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub jupyter_dir: Option<String>,
    pub force: bool,
    pub cancel_unavail: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_hash_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub args: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runtype: Option<Runtype>,
}

impl CreateInstance {
    /// A payload with server defaults for everything but the image.
    pub fn new(image: impl Into<String>) -> Self {
        Self {
            client_id: "me".to_string(),
            image: image.into(),
            env: BTreeMap::new(),
            price: None,
            disk: 10.0,
            label: None,
            extra: None,
            onstart: None,
            image_login: None,
            python_utf8: false,
            lang_utf8: false,
            use_jupyter_lab: false,
            jupyter_dir: None,
            force: false,
            cancel_unavail: false,
            template_hash_id: None,
            args: None,
            runtype: Some(Runtype::Ssh),
        }
    }
}

/// How the instance's container is launched.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Runtype {
    Ssh,
    Args,
    Jupyter,
}

impl Runtype {
    /// Explicit container args win over jupyter; ssh is the fallback.
    pub fn select(has_args: bool, jupyter: bool) -> Self {
        if has_args {
            Runtype::Args
        } else if jupyter {
            Runtype::Jupyter
        } else {
            Runtype::Ssh
        }
    }
}

/// Payload for `PUT /instances/prepay/{id}/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Prepay {
    pub amount: f64,
}

/// Target run state for `PUT /instances/{id}/`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    Running,
    Stopped,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StateChange {
    pub state: RunState,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Label {
    pub label: String,
}

/// Success body of a prepay request.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct PrepayReceipt {
    pub timescale: f64,
    pub discount_rate: f64,
}

/// Success body of a create request.
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct CreatedContract {
    pub new_contract: u64,
}

/// One rented instance as listed by `GET /instances/`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Instance {
    pub id: u64,
    pub machine_id: Option<u64>,
    pub actual_status: Option<String>,
    pub num_gpus: Option<u32>,
    pub gpu_name: Option<String>,
    pub dph_total: Option<f64>,
    pub image_uuid: Option<String>,
    pub label: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct InstanceList {
    pub instances: Vec<Instance>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_instance_omits_unset_optionals() {
        let payload = CreateInstance::new("nvidia/cuda:11.0");
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["client_id"], "me");
        assert_eq!(json["runtype"], "ssh");
        assert!(json.get("price").is_none());
        assert!(json.get("template_hash_id").is_none());
        assert!(json.get("onstart").is_none());
    }

    #[test]
    fn runtype_prefers_args_over_jupyter() {
        assert_eq!(Runtype::select(true, true), Runtype::Args);
        assert_eq!(Runtype::select(false, true), Runtype::Jupyter);
        assert_eq!(Runtype::select(false, false), Runtype::Ssh);
    }

    #[test]
    fn state_change_serializes_lowercase() {
        let json = serde_json::to_string(&StateChange { state: RunState::Stopped }).unwrap();
        assert_eq!(json, r#"{"state":"stopped"}"#);
    }

    #[test]
    fn instance_tolerates_missing_fields() {
        let list: InstanceList =
            serde_json::from_str(r#"{"instances":[{"id":7,"gpu_name":"RTX 4090"}]}"#).unwrap();
        assert_eq!(list.instances[0].id, 7);
        assert_eq!(list.instances[0].gpu_name.as_deref(), Some("RTX 4090"));
        assert!(list.instances[0].label.is_none());
    }
}
