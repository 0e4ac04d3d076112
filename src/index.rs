//! Index rebuilders for the city, country, and root levels of the tree.
//!
//! Every rebuild scans the directory tree and overwrites the whole index
//! document. The tree is the single source of truth; there is no cached
//! model, so a rebuild also repairs the aftermath of a partially failed
//! prior run. Per submission the order is city, then country, then root:
//! each level only lists children that already carry their own index.

use anyhow::{Context, Result};
use std::fs;
use std::path::Path;

use crate::content::{capitalize, DOC_EXT};

/// Index document name at every tree level.
pub const INDEX_FILE: &str = "README.md";

/// The two fixed place categories with their section headings.
pub const CATEGORIES: [(&str, &str); 2] = [("Eat", "## 🍽️ Eat"), ("See", "## 👀 See")];

/// Rebuild the city-level index from the category directories on disk.
pub fn rebuild_city_index(city_path: &Path, city_label: &str) -> Result<()> {
    let mut out = String::new();
    out.push_str(&format!(
        "# {city_label}\n\nYour community guide to {city_label}!\n\n"
    ));

    let mut any = false;
    for (category, heading) in CATEGORIES {
        let entries = place_entries(&city_path.join(category), category)?;
        if entries.is_empty() {
            continue;
        }
        any = true;
        out.push_str(&format!("{heading}\n\n{}\n\n", entries.join("\n")));
    }
    if !any {
        out.push_str("*No places added yet.*\n");
    }
    out.push_str(&format!(
        "---\n\n> [← Back to Country](../{INDEX_FILE}) | [← Back to All Countries](../../{INDEX_FILE})\n"
    ));

    let path = city_path.join(INDEX_FILE);
    fs::write(&path, out).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "rebuilt city index");
    Ok(())
}

/// Rebuild the country-level index. A subdirectory counts as a city only if
/// it already carries its own index document.
pub fn rebuild_country_index(country_path: &Path, country_label: &str) -> Result<()> {
    let cities = indexed_subdirs(country_path)?;
    let mut out = String::new();
    out.push_str(&format!(
        "# {country_label}\n\nExplore cities in {country_label}!\n\n## 🏙️ Cities\n\n"
    ));
    if cities.is_empty() {
        out.push_str("*No cities added yet.*\n");
    } else {
        let entries: Vec<String> = cities
            .iter()
            .map(|dir| format!("- [{}]({dir}/{INDEX_FILE})", dir.replace('_', " ")))
            .collect();
        out.push_str(&format!("{}\n", entries.join("\n")));
    }
    out.push_str(&format!("\n---\n\n> [← Back to All Countries](../{INDEX_FILE})\n"));

    let path = country_path.join(INDEX_FILE);
    fs::write(&path, out).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "rebuilt country index");
    Ok(())
}

/// Rebuild the root index listing every country that carries its own index.
pub fn rebuild_root_index(root: &Path) -> Result<()> {
    let countries = indexed_subdirs(root)?;
    let mut out = String::from(
        "# 🌍 Countries Index\n\nWelcome to the Git Guide! Browse places by country below.\n\n## Available Countries\n\n",
    );
    if countries.is_empty() {
        out.push_str(
            "*No countries yet. Be the first to [propose a place](../../issues/new/choose)!*\n",
        );
    } else {
        let entries: Vec<String> = countries
            .iter()
            .map(|dir| format!("- 🌍 [{}]({dir}/{INDEX_FILE})", dir.replace('_', " ")))
            .collect();
        out.push_str(&format!("{}\n", entries.join("\n")));
    }
    out.push_str("\n---\n\n> This index is automatically updated when new places are approved.\n");

    let path = root.join(INDEX_FILE);
    fs::write(&path, out).with_context(|| format!("write {}", path.display()))?;
    tracing::info!(path = %path.display(), "rebuilt root index");
    Ok(())
}

/// Counts from a whole-tree reindex.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReindexSummary {
    pub cities: usize,
    pub countries: usize,
}

/// Rebuild every index in the tree from disk alone: each country's city
/// indexes first, then the country index, then the root index last.
///
/// Labels are derived from the sanitized directory names, so a reindexed
/// document may differ from the per-issue rendering only in its heading.
pub fn reindex_tree(root: &Path) -> Result<ReindexSummary> {
    fs::create_dir_all(root).with_context(|| format!("create {}", root.display()))?;
    let mut summary = ReindexSummary::default();
    for country_dir in subdirs(root)? {
        let country_path = root.join(&country_dir);
        for city_dir in subdirs(&country_path)? {
            rebuild_city_index(&country_path.join(&city_dir), &city_dir.replace('_', " "))?;
            summary.cities += 1;
        }
        rebuild_country_index(&country_path, &country_dir.replace('_', " "))?;
        summary.countries += 1;
    }
    rebuild_root_index(root)?;
    tracing::info!(
        cities = summary.cities,
        countries = summary.countries,
        "reindexed tree"
    );
    Ok(summary)
}

/// Collect `- [Name](Category/file.md)` entries for one category directory,
/// sorted by filename.
fn place_entries(dir: &Path, category: &str) -> Result<Vec<String>> {
    if !dir.is_dir() {
        return Ok(Vec::new());
    }
    let mut files = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == DOC_EXT) {
            if let (Some(name), Some(stem)) = (
                path.file_name().and_then(|n| n.to_str()),
                path.file_stem().and_then(|s| s.to_str()),
            ) {
                files.push((name.to_string(), stem.to_string()));
            }
        }
    }
    files.sort();
    Ok(files
        .into_iter()
        .map(|(file, stem)| format!("- [{}]({category}/{file})", display_stem(&stem)))
        .collect())
}

/// Human-readable name from a filename stem: underscores to spaces, each
/// word capitalized.
fn display_stem(stem: &str) -> String {
    stem.split('_').map(capitalize).collect::<Vec<_>>().join(" ")
}

/// All immediate subdirectories, sorted by name.
fn subdirs(dir: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(dir).with_context(|| format!("read {}", dir.display()))? {
        let entry = entry?;
        let path = entry.path();
        if path.is_dir() {
            if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Immediate subdirectories that contain their own index document, sorted.
fn indexed_subdirs(dir: &Path) -> Result<Vec<String>> {
    Ok(subdirs(dir)?
        .into_iter()
        .filter(|name| dir.join(name).join(INDEX_FILE).is_file())
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use tempfile::TempDir;

    fn touch(path: &PathBuf) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# stub\n").unwrap();
    }

    #[test]
    fn city_index_reflects_files_on_disk() {
        let tmp = TempDir::new().unwrap();
        let city = tmp.path().join("Rome");
        touch(&city.join("Eat/trattoria_da_mario.md"));
        touch(&city.join("Eat/osteria_del_sole.md"));
        touch(&city.join("See/colosseum.md"));

        rebuild_city_index(&city, "Rome").unwrap();
        let index = fs::read_to_string(city.join(INDEX_FILE)).unwrap();
        assert!(index.starts_with("# Rome\n\nYour community guide to Rome!\n\n"));
        assert!(index.contains("## 🍽️ Eat"));
        assert!(index.contains("- [Osteria Del Sole](Eat/osteria_del_sole.md)"));
        assert!(index.contains("- [Trattoria Da Mario](Eat/trattoria_da_mario.md)"));
        assert!(index.contains("## 👀 See"));
        assert!(index.contains("- [Colosseum](See/colosseum.md)"));
        assert!(index.contains("[← Back to Country](../README.md)"));
        assert!(!index.contains("No places added yet"));

        // Entries within a category come back sorted by filename.
        let eat_first = index.find("Osteria Del Sole").unwrap();
        let eat_second = index.find("Trattoria Da Mario").unwrap();
        assert!(eat_first < eat_second);
    }

    #[test]
    fn city_index_tracks_ground_truth_after_manual_edits() {
        let tmp = TempDir::new().unwrap();
        let city = tmp.path().join("Rome");
        fs::create_dir_all(city.join("Eat")).unwrap();
        rebuild_city_index(&city, "Rome").unwrap();
        assert!(fs::read_to_string(city.join(INDEX_FILE))
            .unwrap()
            .contains("*No places added yet.*"));

        // A file dropped in behind the generator's back shows up on rebuild.
        touch(&city.join("Eat/new_spot.md"));
        rebuild_city_index(&city, "Rome").unwrap();
        assert!(fs::read_to_string(city.join(INDEX_FILE))
            .unwrap()
            .contains("- [New Spot](Eat/new_spot.md)"));

        fs::remove_file(city.join("Eat/new_spot.md")).unwrap();
        rebuild_city_index(&city, "Rome").unwrap();
        assert!(!fs::read_to_string(city.join(INDEX_FILE))
            .unwrap()
            .contains("New Spot"));
    }

    #[test]
    fn country_index_lists_only_cities_with_their_own_index() {
        let tmp = TempDir::new().unwrap();
        let country = tmp.path().join("Italy");
        touch(&country.join("Rome").join(INDEX_FILE));
        touch(&country.join("New_York").join(INDEX_FILE));
        fs::create_dir_all(country.join("Unindexed")).unwrap();

        rebuild_country_index(&country, "Italy").unwrap();
        let index = fs::read_to_string(country.join(INDEX_FILE)).unwrap();
        assert!(index.contains("- [New York](New_York/README.md)"));
        assert!(index.contains("- [Rome](Rome/README.md)"));
        assert!(!index.contains("Unindexed"));
        assert!(index.contains("[← Back to All Countries](../README.md)"));
    }

    #[test]
    fn country_index_placeholder_when_no_city_qualifies() {
        let tmp = TempDir::new().unwrap();
        let country = tmp.path().join("Italy");
        fs::create_dir_all(country.join("Rome")).unwrap();
        rebuild_country_index(&country, "Italy").unwrap();
        assert!(fs::read_to_string(country.join(INDEX_FILE))
            .unwrap()
            .contains("*No cities added yet.*"));
    }

    #[test]
    fn root_index_lists_only_countries_with_their_own_index() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Italy").join(INDEX_FILE));
        fs::create_dir_all(tmp.path().join("Atlantis")).unwrap();

        rebuild_root_index(tmp.path()).unwrap();
        let index = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("- 🌍 [Italy](Italy/README.md)"));
        assert!(!index.contains("Atlantis"));
    }

    #[test]
    fn root_index_call_to_action_when_empty() {
        let tmp = TempDir::new().unwrap();
        rebuild_root_index(tmp.path()).unwrap();
        let index = fs::read_to_string(tmp.path().join(INDEX_FILE)).unwrap();
        assert!(index.contains("*No countries yet."));
        assert!(index.contains("propose a place"));
    }

    #[test]
    fn reindex_rebuilds_every_level_from_disk() {
        let tmp = TempDir::new().unwrap();
        touch(&tmp.path().join("Italy/Rome/Eat/trattoria_da_mario.md"));
        touch(&tmp.path().join("France/Paris/See/louvre.md"));

        let summary = reindex_tree(tmp.path()).unwrap();
        assert_eq!(summary, ReindexSummary { cities: 2, countries: 2 });

        let city = fs::read_to_string(tmp.path().join("Italy/Rome/README.md")).unwrap();
        assert!(city.contains("- [Trattoria Da Mario](Eat/trattoria_da_mario.md)"));
        let country = fs::read_to_string(tmp.path().join("Italy/README.md")).unwrap();
        assert!(country.contains("- [Rome](Rome/README.md)"));
        let root = fs::read_to_string(tmp.path().join("README.md")).unwrap();
        assert!(root.contains("- 🌍 [France](France/README.md)"));
        assert!(root.contains("- 🌍 [Italy](Italy/README.md)"));
    }
}
