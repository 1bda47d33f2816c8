//! Read-only cards for the public pages.

use shelter_pages_core::document::Item;
use shelter_pages_core::items::{Animal, Campaign, Gender, ItemSchema, NewsItem};

use crate::layout::{html_escape, safe_href};

/// Projection of a record into its public card.
pub trait Card: ItemSchema {
    /// Id of the element the cards are rendered into.
    const CONTAINER_ID: &'static str;

    fn render_card(item: &Item<Self>) -> String;

    /// Order in which cards are shown. Store order unless overridden.
    fn arrange(items: &[Item<Self>]) -> Vec<&Item<Self>> {
        items.iter().collect()
    }
}

/// Gender chip followed by one chip per true flag.
pub fn animal_tags(animal: &Animal) -> String {
    let mut tags = match animal.gender {
        Gender::Female => r#"<span class="animal-tag gender-female">Fêmea</span>"#.to_string(),
        Gender::Male => r#"<span class="animal-tag gender-male">Macho</span>"#.to_string(),
    };
    if animal.is_vaccinated {
        tags.push_str(r#"<span class="animal-tag status-vaccinated">Vacinado</span>"#);
    }
    if animal.is_neutered {
        tags.push_str(r#"<span class="animal-tag status-neutered">Castrado</span>"#);
    }
    tags
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "Sim"
    } else {
        "Não"
    }
}

/// Detail panel opened from an animal card.
pub fn render_animal_detail(animal: &Animal) -> String {
    let name = html_escape(&animal.name);
    format!(
        r#"<div class="animal-detail">
<img id="modal-animal-image" src="{image}" alt="Foto de {name}">
<h2 id="modal-animal-name">{name}</h2>
<dl>
<dt>Idade</dt><dd id="modal-animal-age">{age}</dd>
<dt>Porte</dt><dd id="modal-animal-size">{size}</dd>
<dt>Gênero</dt><dd id="modal-animal-gender">{gender}</dd>
<dt>Castrado</dt><dd id="modal-animal-neutered">{neutered}</dd>
<dt>Vacinado</dt><dd id="modal-animal-vaccinated">{vaccinated}</dd>
<dt>Temperamento</dt><dd id="modal-animal-temperament">{temperament}</dd>
</dl>
</div>"#,
        image = html_escape(&animal.image),
        age = html_escape(&animal.age),
        size = html_escape(&animal.size),
        gender = animal.gender.label(),
        neutered = yes_no(animal.is_neutered),
        vaccinated = yes_no(animal.is_vaccinated),
        temperament = html_escape(&animal.temperament),
    )
}

impl Card for Animal {
    const CONTAINER_ID: &'static str = "animal-list";

    fn render_card(item: &Item<Self>) -> String {
        let animal = &item.record;
        let name = html_escape(&animal.name);
        format!(
            r#"<a class="animal-card" href="/pages/adocao/items/{id}" data-animal-id="{id}"><img src="{image}" alt="Foto de {name}"><div class="animals-button-text-container"><div class="animal-attribute-row"><span class="animals-button-characteristics">Nome: </span><span class="animals-button-definitions">{name}</span></div><div class="animal-attribute-row"><span class="animals-button-characteristics">Idade: </span><span class="animals-button-definitions">{age}</span></div><div class="animal-attribute-row"><span class="animals-button-characteristics">Porte: </span><span class="animals-button-definitions">{size}</span></div><div class="animal-tags-container">{tags}</div></div></a>"#,
            id = html_escape(&item.id),
            image = html_escape(&animal.image),
            age = html_escape(&animal.age),
            size = html_escape(&animal.size),
            tags = animal_tags(animal),
        )
    }
}

impl Card for Campaign {
    const CONTAINER_ID: &'static str = "campaigns-list";

    /// Newest year first; equal years keep store order.
    fn arrange(items: &[Item<Self>]) -> Vec<&Item<Self>> {
        let mut sorted: Vec<&Item<Self>> = items.iter().collect();
        sorted.sort_by(|a, b| b.record.year.cmp(&a.record.year));
        sorted
    }

    fn render_card(item: &Item<Self>) -> String {
        let campaign = &item.record;
        // A closed campaign's status is an anchor without href, so it cannot be followed.
        let status = if campaign.is_ongoing() {
            let href = if campaign.link.is_empty() {
                "#"
            } else {
                safe_href(&campaign.link)
            };
            format!(
                r#"<a class="campaign-status status-ongoing" href="{}">Em andamento</a>"#,
                html_escape(href)
            )
        } else {
            r#"<a class="campaign-status status-closed" aria-disabled="true">Encerrada</a>"#
                .to_string()
        };
        format!(
            r#"<div class="campaign-item"><span class="campaign-year">{year}</span><div class="card"><img src="{src}" alt="{alt}"></div>{status}</div>"#,
            year = campaign.year,
            src = html_escape(&campaign.image_src),
            alt = html_escape(&campaign.image_alt),
        )
    }
}

impl Card for NewsItem {
    const CONTAINER_ID: &'static str = "news-list";

    fn render_card(item: &Item<Self>) -> String {
        let news = &item.record;
        let (href, target) = match news.external_link() {
            Some(link) => (
                html_escape(safe_href(link)),
                r#" target="_blank" rel="noopener noreferrer""#,
            ),
            None => ("#".to_string(), ""),
        };
        format!(
            r#"<a class="news-card" href="{href}"{target}><img src="{src}" alt="{alt}"><div class="news-text-content"><span class="news-date">{date}</span><h3 class="news-title">{title}</h3><p class="news-summary">{summary}</p></div></a>"#,
            src = html_escape(&news.image_src),
            alt = html_escape(&news.image_alt),
            date = html_escape(&news.date),
            title = html_escape(&news.title),
            summary = html_escape(&news.summary),
        )
    }
}
