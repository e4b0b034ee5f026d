//! Node credentials and cluster identities

use serde::{Deserialize, Serialize};

use crate::toggle::Toggle;

/// Linux admin account for every Linux node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LinuxProfile {
    pub admin_username: String,
    pub ssh: PublicKeySet,
    pub secrets: Vec<KeyVaultSecrets>,
}

/// SSH keys installed for the admin account
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicKeySet {
    pub public_keys: Vec<PublicKey>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PublicKey {
    pub key_data: String,
}

impl PublicKey {
    pub fn new(key_data: impl Into<String>) -> Self {
        Self {
            key_data: key_data.into(),
        }
    }
}

/// Certificates pulled from one key vault
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyVaultSecrets {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_vault: Option<KeyVaultId>,
    pub vault_certificates: Vec<KeyVaultCertificate>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct KeyVaultId {
    pub id: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyVaultCertificate {
    #[serde(rename = "certificateUrl")]
    pub certificate_url: String,
    pub certificate_store: String,
}

/// Windows admin account and node settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WindowsProfile {
    pub admin_username: String,
    pub admin_password: String,
    #[serde(rename = "enableCSIProxy")]
    pub enable_csi_proxy: Toggle,
    #[serde(rename = "csiProxyURL")]
    pub csi_proxy_url: String,
    pub secrets: Vec<KeyVaultSecrets>,
}

impl WindowsProfile {
    /// CSI proxy is off unless explicitly enabled
    pub fn is_csi_proxy_enabled(&self) -> bool {
        self.enable_csi_proxy.resolve(false)
    }
}

/// Credentials the cluster uses against the cloud API
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServicePrincipalProfile {
    #[serde(rename = "clientId")]
    pub client_id: String,
    pub secret: String,
    #[serde(rename = "objectId")]
    pub object_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub keyvault_secret_ref: Option<KeyvaultSecretRef>,
}

/// A secret held in a key vault
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct KeyvaultSecretRef {
    #[serde(rename = "vaultID")]
    pub vault_id: String,
    pub secret_name: String,
    pub version: String,
}

/// Azure Active Directory integration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AadProfile {
    #[serde(rename = "clientAppID")]
    pub client_app_id: String,
    #[serde(rename = "serverAppID")]
    pub server_app_id: String,
    #[serde(rename = "tenantID")]
    pub tenant_id: String,
    #[serde(rename = "adminGroupID")]
    pub admin_group_id: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_linux_profile() {
        let profile: LinuxProfile = serde_json::from_str(
            r#"{
                "adminUsername": "azureuser",
                "ssh": {"publicKeys": [{"keyData": "ssh-rsa AAAA"}]}
            }"#,
        )
        .unwrap();

        assert_eq!(profile.admin_username, "azureuser");
        assert_eq!(profile.ssh.public_keys, vec![PublicKey::new("ssh-rsa AAAA")]);
        assert!(profile.secrets.is_empty());
    }

    #[test]
    fn test_csi_proxy_defaults_to_disabled() {
        let mut profile = WindowsProfile::default();
        assert!(!profile.is_csi_proxy_enabled());

        profile.enable_csi_proxy = Toggle::Enabled;
        assert!(profile.is_csi_proxy_enabled());

        profile.enable_csi_proxy = Toggle::Disabled;
        assert!(!profile.is_csi_proxy_enabled());
    }

    #[test]
    fn test_decode_service_principal_keyvault_ref() {
        let profile: ServicePrincipalProfile = serde_json::from_str(
            r#"{
                "clientId": "abc",
                "keyvaultSecretRef": {"vaultID": "/subscriptions/x", "secretName": "sp"}
            }"#,
        )
        .unwrap();

        let reference = profile.keyvault_secret_ref.unwrap();
        assert_eq!(reference.vault_id, "/subscriptions/x");
        assert_eq!(reference.secret_name, "sp");
        assert!(reference.version.is_empty());
    }
}
