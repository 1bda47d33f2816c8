use shelter_pages_core::{Listing, PageSnapshot};

use crate::cards::Card;
use crate::layout::{build_page, html_escape, render_summary};

/// Cards of a listing inside their container, or the page's load error.
pub fn render_listing<S: Card>(listing: &Listing<S>) -> String {
    match listing {
        Listing::Ready(items) => {
            let cards: String = S::arrange(items).into_iter().map(S::render_card).collect();
            format!(r#"<div id="{}">{cards}</div>"#, S::CONTAINER_ID)
        }
        Listing::Unavailable => format!(
            r#"<div id="{}"><p>{}</p></div>"#,
            S::CONTAINER_ID,
            html_escape(S::LOAD_ERROR)
        ),
    }
}

/// Full public page: header block and listing.
pub fn render_page<S: Card>(snapshot: &PageSnapshot<S>) -> String {
    let body = format!(
        "{}{}",
        render_summary(&snapshot.content),
        render_listing(&snapshot.listing)
    );
    build_page(&snapshot.content.title, &body)
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelter_pages_core::document::Item;
    use shelter_pages_core::items::{Animal, ItemSchema, NewsItem};
    use shelter_pages_core::PageName;

    #[test]
    fn empty_listing_renders_empty_container() {
        let html = render_listing::<Animal>(&Listing::Ready(vec![]));
        assert_eq!(html, r#"<div id="animal-list"></div>"#);
    }

    #[test]
    fn unavailable_listing_renders_load_error() {
        assert_eq!(
            render_listing::<Animal>(&Listing::Unavailable),
            r#"<div id="animal-list"><p>Erro ao carregar animais.</p></div>"#
        );
        assert!(render_listing::<NewsItem>(&Listing::Unavailable)
            .contains("<p>Erro ao carregar notícias.</p>"));
    }

    #[test]
    fn page_keeps_store_order_of_cards() {
        let animal = |name: &str| Item {
            id: name.to_lowercase(),
            record: Animal {
                name: name.into(),
                ..Animal::template()
            },
        };
        let snapshot = PageSnapshot {
            content: PageName::Adocao.default_content(),
            listing: Listing::Ready(vec![animal("Rex"), animal("Mel")]),
        };
        let html = render_page(&snapshot);
        assert!(html.contains("<title>Adoção</title>"));
        let rex = html.find("data-animal-id=\"rex\"").unwrap();
        let mel = html.find("data-animal-id=\"mel\"").unwrap();
        assert!(rex < mel);
    }
}
