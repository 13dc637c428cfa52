use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;
use drm_keybox::{RevocationChecker, RevocationOutcome, RevocationSource, StaticRevocationSource};

use crate::presenter;
use crate::remote::{DEFAULT_STATUS_URL, HttpRevocationSource};

/**
    Check the certificates of a keybox attestation bundle against the
    revocation list.
*/
#[derive(Args)]
pub struct RevocationCommand {
    /**
        Bundle file, or a directory searched recursively for the first `.xml` file.
    */
    pub path: PathBuf,

    /**
        Do not fetch the revocation list; report it as unavailable.
    */
    #[arg(long)]
    pub offline: bool,

    /**
        Revocation status endpoint.
    */
    #[arg(long, default_value = DEFAULT_STATUS_URL)]
    pub url: String,

    /**
        Request timeout in seconds.
    */
    #[arg(long, default_value_t = 10)]
    pub timeout: u64,

    /**
        Exit with an error when the keybox is revoked or the revocation list
        could not be fetched.
    */
    #[arg(long)]
    pub fail_closed: bool,
}

impl RevocationCommand {
    pub async fn run(self) -> Result<()> {
        let outcome = if self.offline {
            self.check(StaticRevocationSource::unavailable("offline mode"))
                .await?
        } else {
            let source = HttpRevocationSource::new(&self.url, Duration::from_secs(self.timeout))?;
            self.check(source).await?
        };

        println!(
            "{}",
            presenter::render("Keybox Revocation Status", &outcome.to_record())
        );

        if self.fail_closed {
            match &outcome {
                RevocationOutcome::Checked(report) if report.revoked_fail_closed() => {
                    bail!("keybox is revoked or its revocation status is unknown")
                }
                RevocationOutcome::Status(status) => {
                    bail!("keybox bundle could not be checked: {status}")
                }
                RevocationOutcome::Checked(_) => {}
            }
        }

        Ok(())
    }

    async fn check<S: RevocationSource>(&self, source: S) -> Result<RevocationOutcome> {
        RevocationChecker::new(source)
            .check_path(&self.path)
            .await
            .with_context(|| format!("failed to check {}", self.path.display()))
    }
}
