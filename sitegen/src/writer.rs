//! Emits the fixed generated-site directory tree (spec §6.5). Page content
//! here is a minimal pre-formatted placeholder: producing actual HTML is
//! the template layer's job (spec §1 Non-goals), but the directory layout
//! and the pre-formatted fields fed to it are in scope.

use crate::errors::SitegenError;
use crate::sort_keys::SORT_KEYS;
use crate::view::SiteView;
use std::fs;
use std::path::{Path, PathBuf};

pub fn write_site(out_dir: &Path, view: &SiteView) -> Result<(), SitegenError> {
    create_dir(out_dir)?;
    write_index(out_dir, view)?;
    write_misc(out_dir, view)?;
    write_category_pages(out_dir, view)?;
    write_relay_pages(out_dir, view)?;
    create_dir(&out_dir.join("static"))?;
    Ok(())
}

fn create_dir(path: &Path) -> Result<(), SitegenError> {
    fs::create_dir_all(path).map_err(|source| SitegenError::OutputDirUnwritable {
        path: path.to_path_buf(),
        source,
    })
}

fn write(path: PathBuf, contents: &str) -> Result<(), SitegenError> {
    if let Some(parent) = path.parent() {
        create_dir(parent)?;
    }
    fs::write(&path, contents).map_err(|source| SitegenError::OutputDirUnwritable { path, source })
}

fn write_index(out_dir: &Path, view: &SiteView) -> Result<(), SitegenError> {
    let mut relays: Vec<&relay_store::Relay> = view.relays.iter().collect();
    relays.sort_by(|a, b| b.observed_bandwidth.cmp(&a.observed_bandwidth));
    let body: Vec<String> = relays
        .iter()
        .map(|r| format!("{} {} {}", r.fingerprint, r.nickname_truncated, r.obs_bandwidth_with_unit))
        .collect();
    write(out_dir.join("index.html"), &body.join("\n"))
}

fn write_misc(out_dir: &Path, view: &SiteView) -> Result<(), SitegenError> {
    let misc = out_dir.join("misc");
    let all: Vec<String> = view.relays.iter().map(|r| r.fingerprint.clone()).collect();
    write(misc.join("all.html"), &all.join("\n"))?;

    for key in SORT_KEYS {
        write(misc.join(format!("families-{key}.html")), "")?;
        write(misc.join(format!("networks-{key}.html")), "")?;
        write(misc.join(format!("contacts-{key}.html")), "")?;
        write(misc.join(format!("countries-{key}.html")), "")?;
        write(misc.join(format!("platforms-{key}.html")), "")?;
    }

    let authorities: Vec<String> = view
        .relays
        .iter()
        .filter(|r| r.is_authority())
        .map(|r| r.fingerprint.clone())
        .collect();
    write(misc.join("authorities.html"), &authorities.join("\n"))?;

    let leaderboard_lines: Vec<String> = view
        .aroi_leaderboards
        .iter()
        .map(|category| format!("{} ({} pages)", category.meta.title, category.pages.len()))
        .collect();
    write(misc.join("aroi-leaderboards.html"), &leaderboard_lines.join("\n"))?;

    Ok(())
}

fn write_category_pages(out_dir: &Path, view: &SiteView) -> Result<(), SitegenError> {
    write_bucket_pages(out_dir, "as", view.categories.by_as, view)?;
    write_bucket_pages(out_dir, "contact", view.categories.by_contact, view)?;
    write_bucket_pages(out_dir, "country", view.categories.by_country, view)?;
    write_bucket_pages(out_dir, "family", view.categories.by_family, view)?;
    write_bucket_pages(out_dir, "flag", view.categories.by_flag, view)?;
    write_bucket_pages(out_dir, "platform", view.categories.by_platform, view)?;
    write_bucket_pages(out_dir, "first_seen", view.categories.by_first_seen, view)?;
    Ok(())
}

fn write_bucket_pages(
    out_dir: &Path,
    segment: &str,
    bucket: &std::collections::HashMap<String, Vec<usize>>,
    view: &SiteView,
) -> Result<(), SitegenError> {
    for (key, indices) in bucket {
        let body: Vec<String> = indices
            .iter()
            .filter_map(|&idx| view.relays.get(idx))
            .map(|r| r.fingerprint.clone())
            .collect();
        write(out_dir.join(segment).join(key).join("index.html"), &body.join("\n"))?;
    }
    Ok(())
}

fn write_relay_pages(out_dir: &Path, view: &SiteView) -> Result<(), SitegenError> {
    for relay in view.relays {
        let diagnostics_line = match view.relay_diagnostics(&relay.fingerprint) {
            Some(d) => format!(
                "consensus: {}/{} (majority {})",
                d.consensus_status.vote_count, d.consensus_status.total_authorities, d.consensus_status.majority_required
            ),
            None => "consensus: unavailable".to_string(),
        };
        let body = format!(
            "{}\n{}\n{}\n{diagnostics_line}",
            relay.nickname, relay.fingerprint, relay.obs_bandwidth_with_unit
        );
        write(out_dir.join("relay").join(&relay.fingerprint).join("index.html"), &body)?;
    }
    Ok(())
}
