//! Headless driver for the fractional quantity form
//!
//! Builds an in-memory product page, attaches the form core to a live
//! storefront cart and reports what the form would show.

use anyhow::{bail, Context};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};
use fq_cart::{CartService, HttpCartService};
use fq_core::{
    FormMode, FormSurface, FractionalQuantity, MemoryForm, RecordingDrawer, StorefrontConfig,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Serialize)]
struct ProbeReport {
    product: u64,
    variant: u64,
    mode: &'static str,
    cart_item_key: Option<String>,
    field_value: String,
    drawer_opened: bool,
}

impl ProbeReport {
    fn text(&self) -> String {
        let mut out = format!(
            "Product {} / variant {}\n  Mode: {}\n  Field: {}\n",
            self.product, self.variant, self.mode, self.field_value
        );
        if let Some(key) = &self.cart_item_key {
            out.push_str(&format!("  Line key: {key}\n"));
        }
        if self.drawer_opened {
            out.push_str("  Cart drawer opened\n");
        }
        out
    }
}

fn page_args(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("product")
            .long("product")
            .required(true)
            .value_parser(value_parser!(u64))
            .help("Product id"),
    )
    .arg(
        Arg::new("variant")
            .long("variant")
            .required(true)
            .value_parser(value_parser!(u64))
            .help("Variant id"),
    )
    .arg(
        Arg::new("section")
            .long("section")
            .default_value("main")
            .help("Theme section id"),
    )
    .arg(
        Arg::new("min")
            .long("min")
            .help("Fractional input min attribute"),
    )
}

fn cli() -> Command {
    Command::new("fq-probe")
        .version(fq_core::VERSION)
        .about("Fractional quantity form probe")
        .subcommand_required(true)
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Storefront config (TOML)"),
        )
        .arg(
            Arg::new("base-url")
                .long("base-url")
                .global(true)
                .help("Storefront root, overrides the config file"),
        )
        .arg(
            Arg::new("json")
                .long("json")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Output as JSON"),
        )
        .subcommand(page_args(
            Command::new("lookup").about("Show how the form binds to the current cart"),
        ))
        .subcommand(page_args(
            Command::new("update")
                .about("Rewrite the fractional amount of the bound cart line")
                .arg(
                    Arg::new("units")
                        .long("units")
                        .required(true)
                        .help("New fractional amount"),
                ),
        ))
}

fn load_config(matches: &ArgMatches) -> anyhow::Result<StorefrontConfig> {
    let mut config = match matches.get_one::<PathBuf>("config") {
        Some(path) => StorefrontConfig::load(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => StorefrontConfig::default(),
    };
    if let Some(base_url) = matches.get_one::<String>("base-url") {
        config = config.with_base_url(base_url);
    }
    config.validate()?;
    Ok(config)
}

struct Probe {
    page: Arc<MemoryForm>,
    drawer: Arc<RecordingDrawer>,
    component: FractionalQuantity,
    product: u64,
    variant: u64,
}

impl Probe {
    fn attach(config: StorefrontConfig, args: &ArgMatches) -> anyhow::Result<Self> {
        let product = *args.get_one::<u64>("product").context("missing --product")?;
        let variant = *args.get_one::<u64>("variant").context("missing --variant")?;
        let section = args
            .get_one::<String>("section")
            .context("missing --section")?;

        let cart: Arc<dyn CartService> = Arc::new(HttpCartService::new(
            &config.base_url,
            config.request_timeout(),
        )?);
        let page = Arc::new(
            MemoryForm::builder()
                .product(product.to_string())
                .variant(variant.to_string())
                .section(section)
                .fractional_input(
                    fq_core::validator::format_decimal(config.default_min),
                    args.get_one::<String>("min").map(String::as_str),
                )
                .build(),
        );
        let drawer = Arc::new(RecordingDrawer::new());

        let component = FractionalQuantity::new(config, cart, page.clone(), drawer.clone())
            .context("probe page is missing its anchors")?;

        Ok(Self {
            page,
            drawer,
            component,
            product,
            variant,
        })
    }

    fn report(&self) -> ProbeReport {
        ProbeReport {
            product: self.product,
            variant: self.variant,
            mode: match self.component.mode() {
                FormMode::New => "new",
                FormMode::Updating => "updating",
            },
            cart_item_key: self.component.cart_item_key().map(|k| k.to_string()),
            field_value: self.page.fractional_value(),
            drawer_opened: self.drawer.is_open(),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let matches = cli().get_matches();
    let config = load_config(&matches)?;
    let json = matches.get_flag("json");

    let report = match matches.subcommand() {
        Some(("lookup", args)) => {
            let probe = Probe::attach(config, args)?;
            probe.component.refresh_from_cart().await;
            probe.report()
        }
        Some(("update", args)) => {
            let probe = Probe::attach(config, args)?;
            let units = args.get_one::<String>("units").context("missing --units")?;

            probe.component.refresh_from_cart().await;
            if probe.component.mode() != FormMode::Updating {
                bail!(
                    "no fractional line for product {} variant {} in the cart",
                    probe.product,
                    probe.variant
                );
            }

            probe.page.set_fractional_value(units);
            probe.component.validate_input();
            probe.component.submit_update().await;

            if !probe.drawer.is_open() {
                bail!("update was rejected; form resynchronized from the cart");
            }
            probe.report()
        }
        _ => bail!("unknown subcommand"),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.text());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_is_well_formed() {
        cli().debug_assert();
    }

    #[test]
    fn base_url_overrides_default() {
        let matches = cli()
            .try_get_matches_from([
                "fq-probe",
                "--base-url",
                "https://cheese.example/",
                "lookup",
                "--product",
                "100",
                "--variant",
                "10",
            ])
            .unwrap();

        let config = load_config(&matches).unwrap();
        assert_eq!(config.base_url, "https://cheese.example/");
    }

    #[test]
    fn update_requires_units() {
        let result = cli().try_get_matches_from([
            "fq-probe", "update", "--product", "100", "--variant", "10",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn report_text_lists_binding() {
        let report = ProbeReport {
            product: 100,
            variant: 10,
            mode: "updating",
            cart_item_key: Some("abc".to_string()),
            field_value: "2.5".to_string(),
            drawer_opened: false,
        };

        let text = report.text();
        assert!(text.contains("Mode: updating"));
        assert!(text.contains("Line key: abc"));
        assert!(!text.contains("drawer"));
    }
}
