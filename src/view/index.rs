use maud::{Markup, html};

pub const DEFAULT_INDEX_TITLE: &str = "NBA Stats Dashboard";

/// Endpoints listed on the landing page, with the query each link carries.
const API_LINKS: [(&str, &str); 6] = [
    ("/api/players", "Players"),
    ("/api/search-players?q=", "Player search"),
    ("/api/export/players", "Export players (CSV)"),
    ("/api/team-monthly?team_id=", "Team monthly splits"),
    ("/api/team_trends_data?team_id=", "Team trends"),
    ("/api/seasons", "Seasons"),
];

#[must_use]
pub fn render_index_template(title: &str, current_season: &str, seasons: &[String]) -> Markup {
    html! {
        (maud::DOCTYPE)
        head {
            meta charset="UTF-8";
            meta name="viewport" content="width=device-width, initial-scale=1.0";
            title { (title) }
        }
        body {
            h1 { (title) }
            p id="current-season" { "Current season: " (current_season) }
            label for="season" { "Season" }
            select id="season" name="season" {
                @for season in seasons {
                    @if season == current_season {
                        option value=(season) selected { (season) }
                    } @else {
                        option value=(season) { (season) }
                    }
                }
            }
            ul id="api-links" {
                @for (href, label) in API_LINKS {
                    li { a href=(href) { (label) } }
                }
            }
        }
    }
}
