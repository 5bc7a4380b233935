//! Markdown overview of communities and their newest records

use nrp_harvest::CommunityListing;

/// Placeholder for cells with nothing to show
const EMPTY: &str = "-";

/// Community table with a bold grand total and a source footer.
///
/// Communities whose listing failed show no count and do not add to the total.
pub fn render_communities(listings: &[CommunityListing], base: &str, newest: usize) -> String {
    let mut lines = vec![
        format!("| Community (ID) | Name | Records | Links ({newest} newest) |"),
        "|---|---|---:|---|".to_string(),
    ];
    let mut grand_total = 0u64;
    for listing in listings {
        grand_total += listing.total.unwrap_or(0);
        let total = listing
            .total
            .map_or_else(|| EMPTY.to_string(), |t| t.to_string());
        let sample = if listing.newest.is_empty() {
            EMPTY.to_string()
        } else {
            listing.newest.join("<br>")
        };
        lines.push(format!(
            "| `{}` | {} | {} | {} |",
            listing.community.id,
            listing.community.title.replace('|', "\\|"),
            total,
            sample
        ));
    }
    lines.push(format!("| **Total** | {EMPTY} | **{grand_total}** | {EMPTY} |"));
    lines.push(String::new());
    lines.push(format!("_Source: {}_", base.trim_end_matches('/')));
    lines.join("\n") + "\n"
}

#[cfg(test)]
mod tests {
    use super::*;
    use nrp_harvest::Community;

    fn listing(id: &str, title: &str, total: Option<u64>, newest: &[&str]) -> CommunityListing {
        CommunityListing {
            community: Community {
                id: id.to_string(),
                title: title.to_string(),
            },
            total,
            newest: newest.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn table_with_total_row() {
        let md = render_communities(
            &[
                listing("chem", "Chemistry", Some(12), &["[a](https://x/a)", "[b](https://x/b)"]),
                listing("bio", "", Some(3), &[]),
                listing("broken", "Broken", None, &[]),
            ],
            "https://repo.test/",
            5,
        );
        let lines: Vec<&str> = md.lines().collect();
        assert_eq!(lines[0], "| Community (ID) | Name | Records | Links (5 newest) |");
        assert_eq!(lines[2], "| `chem` | Chemistry | 12 | [a](https://x/a)<br>[b](https://x/b) |");
        assert_eq!(lines[3], "| `bio` |  | 3 | - |");
        assert_eq!(lines[4], "| `broken` | Broken | - | - |");
        assert_eq!(lines[5], "| **Total** | - | **15** | - |");
        assert_eq!(lines[7], "_Source: https://repo.test_");
    }

    #[test]
    fn empty_scan() {
        let md = render_communities(&[], "https://repo.test", 5);
        assert!(md.contains("| **Total** | - | **0** | - |"));
    }

    #[test]
    fn header_names_sample_size() {
        let md = render_communities(&[listing("chem", "Chemistry", Some(1), &[])], "https://repo.test", 3);
        assert!(md.starts_with("| Community (ID) | Name | Records | Links (3 newest) |\n"));
    }
}
