//! Approver groups, their memberships, and per-group notification
//! subscriptions.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub group_id: String,
    pub group_name: String,
    pub description: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemberRole {
    Member,
    Owner,
}

/// One (group, user) membership. Uniqueness per pair is the store's concern;
/// this layer does not guarantee duplicate-add idempotency.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMembership {
    pub group_id: String,
    pub user_id: String,
    pub role: MemberRole,
}

/// A configured delivery channel (e.g. a Slack channel) for a subscription.
/// Property semantics belong to the channel type's plugin; this core only
/// checks them against the declared schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationChannel {
    pub id: String,
    pub type_id: String,
    pub properties: serde_json::Map<String, serde_json::Value>,
}

/// Subscription: notify the channel when group membership changes.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroupMemberNotification {
    pub notification_id: String,
    pub group_id: String,
    pub notification_channel: NotificationChannel,
}

/// Subscription: notify the channel about approval-request activity for the
/// group. Independent of [`GroupMemberNotification`] — a group may hold
/// either, both, or neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApprovalRequestNotification {
    pub notification_id: String,
    pub group_id: String,
    pub notification_channel: NotificationChannel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationPropertyType {
    String,
    Number,
    Boolean,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPropertyDefinition {
    pub id: String,
    #[serde(rename = "type")]
    pub property_type: NotificationPropertyType,
    #[serde(default)]
    pub required: bool,
}

/// A notification channel type and its declared config schema, registered by
/// an external plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationType {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub channel_config_properties: Vec<NotificationPropertyDefinition>,
}

impl NotificationType {
    /// Validate submitted channel properties against this type's schema.
    /// Returns a field-keyed error map; the caller must not write anything
    /// when this fails.
    pub fn validate_properties(
        &self,
        properties: &serde_json::Map<String, serde_json::Value>,
    ) -> Result<(), HashMap<String, String>> {
        let mut errors = HashMap::new();

        for def in &self.channel_config_properties {
            let value = match properties.get(&def.id) {
                Some(v) if !v.is_null() => v,
                _ => {
                    if def.required {
                        errors.insert(def.id.clone(), "required property is missing".to_string());
                    }
                    continue;
                }
            };

            let ok = match def.property_type {
                NotificationPropertyType::String => value.is_string(),
                NotificationPropertyType::Number => {
                    value.is_number()
                        || value
                            .as_str()
                            .map(|s| s.trim().parse::<f64>().is_ok())
                            .unwrap_or(false)
                }
                NotificationPropertyType::Boolean => {
                    value.is_boolean()
                        || matches!(value.as_str(), Some("true") | Some("false"))
                }
            };
            if !ok {
                errors.insert(
                    def.id.clone(),
                    format!("expected a {:?} value", def.property_type).to_lowercase(),
                );
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn slack_type() -> NotificationType {
        NotificationType {
            id: "slack".into(),
            name: "Slack".into(),
            channel_config_properties: vec![
                NotificationPropertyDefinition {
                    id: "channelId".into(),
                    property_type: NotificationPropertyType::String,
                    required: true,
                },
                NotificationPropertyDefinition {
                    id: "customMessage".into(),
                    property_type: NotificationPropertyType::String,
                    required: false,
                },
                NotificationPropertyDefinition {
                    id: "retryCount".into(),
                    property_type: NotificationPropertyType::Number,
                    required: false,
                },
            ],
        }
    }

    fn props(v: serde_json::Value) -> serde_json::Map<String, serde_json::Value> {
        v.as_object().unwrap().clone()
    }

    #[test]
    fn accepts_valid_properties_and_ignores_optionals() {
        let t = slack_type();
        assert!(t.validate_properties(&props(json!({"channelId": "C123"}))).is_ok());
        assert!(t
            .validate_properties(&props(json!({"channelId": "C123", "retryCount": 3})))
            .is_ok());
        // numeric strings come in from forms
        assert!(t
            .validate_properties(&props(json!({"channelId": "C123", "retryCount": "3"})))
            .is_ok());
    }

    #[test]
    fn missing_required_property_is_keyed_in_the_error_map() {
        let t = slack_type();
        let errors = t
            .validate_properties(&props(json!({"customMessage": "hi"})))
            .unwrap_err();
        assert!(errors.contains_key("channelId"));
        assert!(!errors.contains_key("customMessage"));
    }

    #[test]
    fn non_numeric_value_for_number_property_fails() {
        let t = slack_type();
        let errors = t
            .validate_properties(&props(
                json!({"channelId": "C123", "retryCount": "often"}),
            ))
            .unwrap_err();
        assert!(errors.contains_key("retryCount"));
    }
}
