use api_shared::sign_request_body;
use certlocker_core::config::resolve_certificate_template;
use certlocker_core::constants::{DEFAULT_CERTIFICATE_URI_BASE, DEFAULT_DOC_TYPE};
use certlocker_core::formatting::display_fields;
use certlocker_core::{CoreConfig, CredentialBundle};
use certlocker_render::assets::RenderAssets;
use certlocker_render::pdf::PdfRenderer;
use certlocker_render::DocumentRenderer;
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "certlocker")]
#[command(about = "certlocker operator CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the signature header value for a Pull-URI request body
    Sign {
        /// File holding the exact request body
        body_file: PathBuf,
        /// Shared key (defaults to DIGILOCKER_HMAC_KEY)
        #[arg(long)]
        key: Option<String>,
    },
    /// Render a signed credential to a certificate PDF
    Render {
        /// Signed credential JSON
        credential: PathBuf,
        /// Output PDF path
        out: PathBuf,
        /// Certificate id printed on the document (defaults to the credential file stem)
        #[arg(long)]
        certificate_id: Option<String>,
        /// Date of birth used when the credential has none (DD-MM-YYYY or YYYY-MM-DD)
        #[arg(long, default_value = "")]
        dob: String,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Commands::Sign { body_file, key } => {
            let key = match key {
                Some(key) => key,
                None => std::env::var("DIGILOCKER_HMAC_KEY")
                    .map_err(|_| "DIGILOCKER_HMAC_KEY is not set and --key was not given")?,
            };
            let body = std::fs::read(&body_file)?;
            println!("{}", sign_request_body(&body, key.as_bytes()));
        }
        Commands::Render {
            credential,
            out,
            certificate_id,
            dob,
        } => {
            let certificate_id = certificate_id
                .or_else(|| {
                    credential
                        .file_stem()
                        .map(|stem| stem.to_string_lossy().into_owned())
                })
                .ok_or("could not derive a certificate id; pass --certificate-id")?;

            let config = CoreConfig::new(
                std::env::var("DIGILOCKER_DOC_TYPE").unwrap_or_else(|_| DEFAULT_DOC_TYPE.into()),
                std::env::var("CERTIFICATE_URI_BASE")
                    .unwrap_or_else(|_| DEFAULT_CERTIFICATE_URI_BASE.into()),
                Duration::from_secs(1),
            )?;
            let payload = std::fs::read_to_string(&credential)?;
            let bundle = CredentialBundle::from_signed_payload(&config, &certificate_id, payload)?;

            let template = resolve_certificate_template(
                std::env::var("CERTIFICATE_TEMPLATE_PDF").ok().map(PathBuf::from),
            )?;
            let font = std::env::var("CERTIFICATE_FONT_TTF").ok().map(PathBuf::from);
            let assets = RenderAssets::load(&template, font.as_deref())?;
            let renderer = PdfRenderer::new(Arc::new(assets));

            let today = chrono::Utc::now().date_naive();
            let fields = display_fields(&bundle, &dob, today);
            let pdf = renderer.render(&fields, bundle.signed_payload())?;
            std::fs::write(&out, &pdf)?;

            println!(
                "Rendered certificate {} to {} ({} bytes)",
                bundle.certificate_id(),
                out.display(),
                pdf.len()
            );
        }
    }

    Ok(())
}
