//! Linux profile rule and the key vault secret checks shared with Windows

use clusterspec_core::KeyVaultSecrets;

use super::RuleContext;
use crate::error::{Result, ValidationError};

pub fn check_linux_profile(context: &RuleContext<'_>) -> Result<()> {
    let Some(linux) = &context.spec.linux_profile else {
        return Ok(());
    };
    if linux.ssh.public_keys.iter().any(|key| key.key_data.is_empty()) {
        return Err(ValidationError::structural(
            "KeyData in LinuxProfile.SSH.PublicKeys cannot be empty string",
        ));
    }
    validate_keyvault_secrets(&linux.secrets, false)
}

/// Every secret names its vault and carries parseable certificate URLs.
///
/// Windows profiles additionally need a certificate store for each certificate.
pub(crate) fn validate_keyvault_secrets(secrets: &[KeyVaultSecrets], require_cert_store: bool) -> Result<()> {
    for secret in secrets {
        if secret.vault_certificates.is_empty() {
            return Err(ValidationError::structural(
                "Valid KeyVaultSecrets must have no empty VaultCertificates",
            ));
        }
        let Some(vault) = &secret.source_vault else {
            return Err(ValidationError::structural("missing SourceVault in KeyVaultSecrets"));
        };
        if vault.id.is_empty() {
            return Err(ValidationError::structural("KeyVaultSecrets must have a SourceVault.ID"));
        }

        for certificate in &secret.vault_certificates {
            if !certificate.certificate_url.is_empty() {
                url::Url::parse(&certificate.certificate_url).map_err(|e| {
                    ValidationError::structural(format!("Certificate url was invalid. received error {}", e))
                })?;
            }
            if require_cert_store && certificate.certificate_store.is_empty() {
                return Err(ValidationError::structural(
                    "KeyVaultCertificate.CertificateStore must be a non-empty value for certificates in a WindowsProfile",
                ));
            }
        }
    }
    Ok(())
}
