//! Edit form markup for pages with an item collection.
//!
//! The form is a projection of an [`EditSession`]. Values are posted back per
//! fragment, addressed by the fragment's `data-key`.

use shelter_pages_core::form::{to_data, Control, FieldSpec};
use shelter_pages_core::items::ItemSchema;
use shelter_pages_core::session::{EditEntry, EditSession};

use crate::layout::html_escape;

fn control_id(spec: &FieldSpec, key: &str) -> String {
    format!("{}-{}", spec.name, key)
}

/// One labelled control for a field of a record.
pub fn render_control(spec: &FieldSpec, key: &str, data: &serde_json::Map<String, serde_json::Value>) -> String {
    let id = html_escape(&control_id(spec, key));
    let name = spec.name;
    let label = html_escape(spec.label);
    let value = html_escape(&spec.display_value(data));
    let required = if spec.required { " required" } else { "" };

    let input = match spec.control {
        Control::Text => format!(
            r#"<input type="text" id="{id}" name="{name}" value="{value}"{required}>"#
        ),
        Control::Number => format!(
            r#"<input type="number" id="{id}" name="{name}" value="{value}"{required}>"#
        ),
        Control::TextArea { rows } => format!(
            r#"<textarea id="{id}" name="{name}" rows="{rows}"{required}>{value}</textarea>"#
        ),
        Control::Select(options) => {
            let current = spec.display_value(data);
            let opts: String = options
                .iter()
                .map(|o| {
                    let selected = if o.value == current { " selected" } else { "" };
                    format!(
                        r#"<option value="{}"{selected}>{}</option>"#,
                        html_escape(o.value),
                        html_escape(o.label)
                    )
                })
                .collect();
            format!(r#"<select id="{id}" name="{name}">{opts}</select>"#)
        }
        Control::Checkbox | Control::Toggle { .. } => {
            let checked = if spec.is_checked(data) { " checked" } else { "" };
            return format!(
                r#"<div class="form-group checkbox-group"><input type="checkbox" id="{id}" name="{name}"{checked}><label for="{id}">{label}</label></div>"#
            );
        }
    };

    let visibility = match spec.shown_when {
        Some(cond) => {
            let hidden = if spec.is_visible(data) { "" } else { " hidden" };
            format!(
                r#" data-shown-when="{}={}"{hidden}"#,
                cond.field,
                html_escape(cond.equals)
            )
        }
        None => String::new(),
    };

    format!(r#"<div class="form-group"{visibility}><label for="{id}">{label}</label>{input}</div>"#)
}

/// One fragment of the edit form. Removed fragments stay in the markup, hidden.
pub fn render_fragment<S: ItemSchema>(entry: &EditEntry<S>) -> String {
    let key = html_escape(entry.key.form_key());
    let data = to_data(&entry.record);
    let controls: String = S::FIELDS
        .iter()
        .map(|spec| render_control(spec, entry.key.form_key(), &data))
        .collect();
    let deleted = if entry.deleted {
        r#" data-deleted="true" hidden"#
    } else {
        ""
    };

    format!(
        r#"<div class="form-section" data-key="{key}"{deleted}><button type="button" class="remove-item" data-confirm="{prompt}">Remover</button><h4>{heading}</h4>{controls}<div class="form-group image-group"><label for="image-{key}">{image_label}</label><img class="image-preview" src="{preview}" alt="Pré-visualização"><input type="file" id="image-{key}" name="image" accept="image/*"></div></div>"#,
        prompt = html_escape(S::REMOVE_PROMPT),
        heading = html_escape(&entry.record.heading()),
        image_label = html_escape(S::IMAGE_LABEL),
        preview = html_escape(entry.preview()),
    )
}

/// Whole edit form: page header inputs followed by every fragment.
pub fn render_edit_form<S: ItemSchema>(session: &EditSession<S>) -> String {
    let content = session.content();
    let fragments: String = session.entries().iter().map(render_fragment).collect();
    format!(
        r#"<form id="edit-form" data-page="{page}"><div class="form-section page-content"><div class="form-group"><label for="page-title">Título</label><input type="text" id="page-title" name="title" value="{title}"></div><div class="form-group"><label for="page-subtitle">Subtítulo</label><input type="text" id="page-subtitle" name="subtitle" value="{subtitle}"></div></div><button type="button" id="add-item">Adicionar</button><div id="items-container">{fragments}</div><button type="submit" id="save-changes">Salvar Alterações</button></form>"#,
        page = S::PAGE,
        title = html_escape(&content.title),
        subtitle = html_escape(&content.subtitle),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelter_pages_core::document::Item;
    use shelter_pages_core::image::ImageUpload;
    use shelter_pages_core::items::{Animal, Campaign, CampaignStatus, NewsItem};
    use shelter_pages_core::{Listing, MemoryStore, PageCollectionEditor, PageName, PageSnapshot};
    use std::sync::Arc;

    fn open<S: ItemSchema>(items: Vec<Item<S>>) -> EditSession<S> {
        let editor = PageCollectionEditor::<S>::new(Arc::new(MemoryStore::new()), 1);
        editor.open(&PageSnapshot {
            content: S::PAGE.default_content(),
            listing: Listing::Ready(items),
        })
    }

    fn rex() -> Item<Animal> {
        Item {
            id: "rex".into(),
            record: Animal {
                name: "Rex".into(),
                size: "Médio".into(),
                is_vaccinated: true,
                image: "https://img.example/rex.jpg".into(),
                ..Animal::template()
            },
        }
    }

    #[test]
    fn fragment_prefills_every_control() {
        let session = open(vec![rex()]);
        let html = render_fragment(&session.entries()[0]);
        assert!(html.contains(r#"data-key="rex""#));
        assert!(html.contains("<h4>Animal: Rex</h4>"));
        assert!(html.contains(r#"name="name" value="Rex" required"#));
        assert!(html.contains(r#"<option value="Médio" selected>Médio</option>"#));
        assert!(html.contains(r#"id="isVaccinated-rex" name="isVaccinated" checked"#));
        assert!(html.contains(r#"id="isNeutered-rex" name="isNeutered">"#));
        assert!(html.contains(r#"src="https://img.example/rex.jpg""#));
        assert!(html.contains(r#"data-confirm="Tem certeza que deseja remover este animal?""#));
    }

    #[test]
    fn removed_fragment_is_kept_hidden() {
        let mut session = open(vec![rex()]);
        session.remove("rex", true).unwrap();
        let html = render_edit_form(&session);
        assert!(html.contains(r#"data-key="rex" data-deleted="true" hidden"#));
    }

    #[test]
    fn preview_follows_chosen_upload() {
        let mut session = open(vec![rex()]);
        session
            .choose_image(
                "rex",
                ImageUpload::new("rex.png", None, vec![1]),
                "/admin/preview/rex".into(),
            )
            .unwrap();
        assert!(render_fragment(&session.entries()[0]).contains(r#"src="/admin/preview/rex""#));
    }

    #[test]
    fn campaign_link_hidden_unless_ongoing() {
        let campaign = |status| Item {
            id: "c".into(),
            record: Campaign {
                year: 2024,
                status,
                ..Campaign::template()
            },
        };
        let closed = render_fragment(&open(vec![campaign(CampaignStatus::Closed)]).entries()[0]);
        assert!(closed.contains(r#"data-shown-when="status=ongoing" hidden"#));
        let ongoing = render_fragment(&open(vec![campaign(CampaignStatus::Ongoing)]).entries()[0]);
        assert!(ongoing.contains(r#"data-shown-when="status=ongoing">"#));
        assert!(ongoing.contains(r#"id="status-c" name="status" checked"#));
    }

    #[test]
    fn form_carries_page_content_and_new_fragments_first() {
        let mut session = open::<NewsItem>(vec![]);
        session
            .set_content("Trabalhos & ações".into(), "Sub".into())
            .unwrap();
        let key = session.add_new().unwrap();
        let html = render_edit_form(&session);
        assert!(html.contains(&format!(r#"data-page="{}""#, PageName::Trabalhos)));
        assert!(html.contains(r#"value="Trabalhos &amp; ações""#));
        assert!(html.contains(&format!(r#"data-key="{key}""#)));
        assert!(html.contains(r#"<textarea id="summary-"#));
    }
}
