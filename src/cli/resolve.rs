//! `linkicon resolve`: resolve one link's icon from the command line.

use anyhow::Result;

use super::args::ResolveArgs;
use super::common::{build_runtime, http_fetcher, preview};
use crate::config::LinkiconConfig;
use crate::core::LinkAddress;
use crate::logger::outcome_ok;
use crate::resolver::{IconRequest, IconResolver, ResolverSettings};

/// Characters of a data URI shown in the outcome line.
const PREVIEW_CHARS: usize = 48;

/// Resolve and print the icon; the full icon string goes to stdout last.
pub fn run_resolve(args: &ResolveArgs, config: &LinkiconConfig) -> Result<()> {
    let runtime = build_runtime()?;
    let resolver = IconResolver::new(
        http_fetcher(config)?,
        ResolverSettings::from(&config.resolver),
    );

    let request = build_request(args);
    let target = request
        .address
        .effective_url(request.prefer_internal)
        .unwrap_or("-")
        .to_string();
    let icon = runtime.block_on(resolver.resolve(&request));

    let rendered = icon.to_string();
    outcome_ok(&format!(
        "{} -> {} {}",
        target,
        icon.kind(),
        preview(&rendered, PREVIEW_CHARS)
    ));
    println!("{rendered}");
    Ok(())
}

fn build_request(args: &ResolveArgs) -> IconRequest<'static> {
    IconRequest::new(LinkAddress::new(args.internal.as_deref(), Some(&args.url)))
        .stored_icon(args.stored.as_deref())
        .prefer_internal(args.prefer_internal)
        .title(args.title.as_deref())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Commands};
    use clap::Parser;

    fn args(argv: &[&str]) -> ResolveArgs {
        let mut full = vec!["linkicon", "resolve"];
        full.extend_from_slice(argv);
        match Cli::parse_from(full).command {
            Commands::Resolve { args } => args,
            _ => unreachable!(),
        }
    }

    #[test]
    fn test_request_from_args() {
        let request = build_request(&args(&[
            "https://nas.example.com",
            "-i",
            "http://nas.local",
            "-t",
            "NAS",
        ]));
        assert_eq!(request.address.internal(), Some("http://nas.local"));
        assert_eq!(request.address.external(), Some("https://nas.example.com"));
        assert_eq!(request.title.as_deref(), Some("NAS"));
        assert!(!request.prefer_internal);
    }

    #[tokio::test]
    async fn test_stored_icon_short_circuits() {
        let request = build_request(&args(&["https://github.com", "-s", "/icons/gh.svg"]));
        let fetch = std::sync::Arc::new(crate::fetch::testing::ScriptedFetch::new());
        let resolver = IconResolver::new(fetch.clone(), ResolverSettings::default());

        let icon = resolver.resolve(&request).await;
        assert_eq!(icon.to_string(), "/icons/gh.svg");
        assert_eq!(fetch.calls(), 0);
    }
}
