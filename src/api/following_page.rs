//! Extraction of the server-rendered following page.
//!
//! The page has no JSON twin, so the two tables, the form action and the
//! CSRF token are read straight from the HTML.

use crate::api::models::{FollowingEntry, FollowingPage, UserId};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;

macro_rules! selector {
    ($name:ident, $query:expr) => {
        static $name: LazyLock<Selector> =
            LazyLock::new(|| Selector::parse($query).expect("static selector"));
    };
}

selector!(FORM, "#content form");
selector!(CSRF, r#"input[name="csrfmiddlewaretoken"]"#);
selector!(OBSERVED_ROWS, "#observed table tr");
selector!(NOT_OBSERVED_ROWS, "#not-observed table tr");
selector!(REMOVE_LINK, "a.remove[data-id]");
selector!(RESTORE_LINK, "a.restore[data-id]");
selector!(CELL, "td");
selector!(REASON, "td.reason");

pub fn parse(html: &str) -> FollowingPage {
    let document = Html::parse_document(html);

    let action = document
        .select(&FORM)
        .next()
        .and_then(|form| form.value().attr("action"))
        .map(str::to_string);
    let csrf_token = document
        .select(&CSRF)
        .next()
        .and_then(|input| input.value().attr("value"))
        .map(str::to_string);

    let observed = document
        .select(&OBSERVED_ROWS)
        .filter_map(|row| row_entry(row, &REMOVE_LINK, true))
        .collect();
    let not_observed = document
        .select(&NOT_OBSERVED_ROWS)
        .filter_map(|row| row_entry(row, &RESTORE_LINK, false))
        .collect();

    FollowingPage {
        action,
        csrf_token,
        observed,
        not_observed,
    }
}

fn row_entry(row: ElementRef<'_>, link: &Selector, with_reason: bool) -> Option<FollowingEntry> {
    let id: UserId = row
        .select(link)
        .next()?
        .value()
        .attr("data-id")?
        .trim()
        .parse()
        .ok()?;
    let name = row.select(&CELL).next().map(text_of).unwrap_or_default();
    let reason = if with_reason {
        row.select(&REASON).next().map(text_of).unwrap_or_default()
    } else {
        String::new()
    };
    Some(FollowingEntry { id, name, reason })
}

fn text_of(element: ElementRef<'_>) -> String {
    element
        .text()
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r##"
<html><body><div id="content">
  <form action="/following/save/" method="post">
    <input type="hidden" name="csrfmiddlewaretoken" value="tok123">
    <input id="id_search" name="search">
  </form>
  <div id="observed"><table>
    <tr><th>Name</th><th>Reason</th><th></th></tr>
    <tr><td>Alice  Smith</td><td class="reason">teammate</td>
        <td><a href="#" class="remove" data-id="7">remove</a></td></tr>
    <tr><td>Bob</td><td class="reason">your manager</td>
        <td><a href="#" class="remove" data-id="9">remove</a></td></tr>
  </table></div>
  <div id="not-observed"><table>
    <tr><td>Carol</td><td><a href="#" class="restore" data-id="11">restore</a></td></tr>
  </table></div>
</div></body></html>"##;

    #[test]
    fn test_parse_following_page() {
        let page = parse(PAGE);
        assert_eq!(page.action.as_deref(), Some("/following/save/"));
        assert_eq!(page.csrf_token.as_deref(), Some("tok123"));
        assert_eq!(page.observed.len(), 2);
        assert_eq!(
            page.observed[0],
            FollowingEntry { id: 7, name: "Alice Smith".into(), reason: "teammate".into() }
        );
        assert_eq!(page.not_observed.len(), 1);
        assert_eq!(page.not_observed[0].id, 11);
        assert_eq!(page.not_observed[0].name, "Carol");
        assert!(page.not_observed[0].reason.is_empty());
    }

    #[test]
    fn test_parse_page_without_tables() {
        let page = parse("<html><body><p>Log in</p></body></html>");
        assert_eq!(page, FollowingPage::default());
    }
}
