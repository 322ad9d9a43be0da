//! CLI route tests against a temporary workspace

use clap::Parser;
use sitemap_engine::cli::{map_error, Cli, Commands, RunContext};
use tempfile::TempDir;

fn run(ctx: &RunContext, args: &[&str]) -> Result<String, String> {
    let mut argv = vec!["sitemap"];
    argv.extend_from_slice(args);
    let cli = Cli::try_parse_from(argv).map_err(|e| e.to_string())?;
    ctx.execute(&cli.command).map_err(|e| map_error(&e))
}

fn workspace() -> (TempDir, RunContext) {
    let temp = TempDir::new().unwrap();
    let ctx = RunContext::new(temp.path().to_path_buf(), None).unwrap();
    (temp, ctx)
}

/// Id of the page whose title is `title`, read from the JSON tree.
fn page_id(ctx: &RunContext, sitemap: &str, title: &str) -> String {
    let json = run(ctx, &["tree", sitemap, "--format", "json"]).unwrap();
    let view: serde_json::Value = serde_json::from_str(&json).unwrap();
    fn find(entry: &serde_json::Value, title: &str) -> Option<String> {
        if entry["title"] == title {
            return entry["id"].as_str().map(str::to_string);
        }
        entry["children"]
            .as_array()?
            .iter()
            .find_map(|child| find(child, title))
    }
    find(&view["root"], title)
        .or_else(|| {
            view["orphans"]
                .as_array()?
                .iter()
                .find_map(|orphan| find(orphan, title))
        })
        .unwrap()
}

#[test]
fn test_page_commands_persist_between_runs() {
    let (temp, ctx) = workspace();
    run(&ctx, &["init", "Acme", "--id", "acme"]).unwrap();
    run(&ctx, &["add", "acme", "Services"]).unwrap();
    let services = page_id(&ctx, "acme", "Services");
    let out = run(&ctx, &["add", "acme", "SEO Audits", "--parent", &services]).unwrap();
    assert!(out.ends_with("/services/seo-audits"));
    drop(ctx);

    let ctx = RunContext::new(temp.path().to_path_buf(), None).unwrap();
    let seo = page_id(&ctx, "acme", "SEO Audits");
    let out = run(&ctx, &["move", "acme", &seo, "--orphan"]).unwrap();
    assert!(out.ends_with("/seo-audits"));

    let text = run(&ctx, &["tree", "acme"]).unwrap();
    assert!(text.contains("Orphans"));

    let out = run(&ctx, &["delete", "acme", &services]).unwrap();
    assert_eq!(out, "Deleted 1 page(s) and 0 link(s)");
}

#[test]
fn test_link_review_commands() {
    let (_temp, ctx) = workspace();
    run(&ctx, &["init", "Acme", "--id", "acme"]).unwrap();
    run(&ctx, &["add", "acme", "Blog"]).unwrap();
    run(&ctx, &["add", "acme", "Pricing"]).unwrap();
    let blog = page_id(&ctx, "acme", "Blog");
    let pricing = page_id(&ctx, "acme", "Pricing");

    let out = run(&ctx, &["link", "acme", &blog, &pricing, "--anchor", "plans"]).unwrap();
    assert!(out.ends_with("(planned)"));
    let edge = out
        .trim_start_matches("Link ")
        .split(' ')
        .next()
        .unwrap()
        .to_string();

    run(&ctx, &["reject", "acme", &edge]).unwrap();
    run(&ctx, &["approve", "acme", &edge]).unwrap();

    let json = run(&ctx, &["links", "acme", "--format", "json"]).unwrap();
    let links: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(links["stats"]["approved"], 1);
    assert_eq!(links["edges"][0]["anchor_text"], "plans");
    let text = run(&ctx, &["links", "acme"]).unwrap();
    assert!(text.ends_with("Total: 1 (1 approved)"));

    let self_link = run(&ctx, &["link", "acme", &blog, &blog]).unwrap_err();
    assert!(self_link.starts_with("error (invalid)"));
}

#[test]
fn test_list_and_missing_sitemap() {
    let (_temp, ctx) = workspace();
    let empty = run(&ctx, &["list"]).unwrap();
    assert!(empty.starts_with("No sitemaps yet"));

    run(&ctx, &["init", "Acme", "--id", "acme"]).unwrap();
    let json = run(&ctx, &["list", "--format", "json"]).unwrap();
    let docs: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(docs[0]["name"], "Acme");

    let missing = ctx
        .execute(&Commands::Tree {
            sitemap: "other".to_string(),
            format: "text".to_string(),
        })
        .unwrap_err();
    assert!(map_error(&missing).starts_with("error (not found)"));
}
