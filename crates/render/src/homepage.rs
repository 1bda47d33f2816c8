//! Public homepage and its edit form.

use shelter_pages_core::homepage::{HomepageDocument, HomepageSession, ImageSlot};
use shelter_pages_core::PageName;

use crate::layout::{build_page, html_escape, safe_href};

fn render_carousel(images: &[String]) -> String {
    let slides: String = images
        .iter()
        .filter(|src| !src.trim().is_empty())
        .enumerate()
        .map(|(i, src)| {
            format!(
                r#"<img src="{}" alt="Slide {}">"#,
                html_escape(src),
                i + 1
            )
        })
        .collect();
    format!(r#"<div class="carousel"><div class="slides">{slides}</div></div>"#)
}

fn render_buttons(doc: &HomepageDocument) -> String {
    let buttons: String = doc
        .action_buttons
        .iter()
        .filter(|b| !b.title.trim().is_empty() || !b.img_src.trim().is_empty())
        .map(|b| {
            let href = b.link.as_deref().filter(|l| !l.is_empty()).unwrap_or("#");
            format!(
                r#"<a class="action-button" href="{href}"><img src="{src}" alt=""><span class="button-title">{title}</span><span class="button-subtitle">{subtitle}</span></a>"#,
                href = html_escape(safe_href(href)),
                src = html_escape(&b.img_src),
                title = html_escape(&b.title),
                subtitle = html_escape(&b.subtitle),
            )
        })
        .collect();
    format!(r#"<div class="button-container">{buttons}</div>"#)
}

/// Supplies list with entries trimmed and blank entries skipped.
pub fn render_supplies(entries: &[String]) -> String {
    let items: String = entries
        .iter()
        .map(|e| e.trim())
        .filter(|e| !e.is_empty())
        .map(|e| format!("<li>{}</li>", html_escape(e)))
        .collect();
    format!(r#"<div id="mantimentos-modal"><ul>{items}</ul></div>"#)
}

fn render_footer(doc: &HomepageDocument) -> String {
    let f = &doc.footer;
    format!(
        r#"<footer><img class="footer-logo" src="{logo}" alt="Logo"><div class="footer-contact"><p><strong>Apoio animal:</strong> {phone}</p><p id="footer-address"><strong>Endereço:</strong> {address}</p></div><div class="footer-social"><span id="social-facebook-text">{facebook}</span><span id="social-instagram-text">{instagram}</span></div><div class="footer-donation"><span id="chave-pix">{pix}</span><img class="pix-qr-code" src="{qr}" alt="QR Code PIX"></div>{supplies}</footer>"#,
        logo = html_escape(&f.logo_src),
        phone = html_escape(&f.contact_phone),
        address = html_escape(&f.address),
        facebook = html_escape(&f.social_facebook),
        instagram = html_escape(&f.social_instagram),
        pix = html_escape(&f.pix_text),
        qr = html_escape(&f.qr_code_src),
        supplies = render_supplies(&f.mantimentos_list),
    )
}

/// Public homepage. Without a stored document the empty built-in layout is shown.
pub fn render_homepage(doc: Option<&HomepageDocument>) -> String {
    let fallback = HomepageDocument::default();
    let doc = doc.unwrap_or(&fallback);
    let body = format!(
        "{}{}{}",
        render_carousel(&doc.carousel_images),
        render_buttons(doc),
        render_footer(doc)
    );
    build_page(&PageName::PaginaInicial.default_content().title, &body)
}

fn image_control(id: &str, label: &str, slot: &ImageSlot) -> String {
    format!(
        r#"<div class="form-group image-group" data-slot="{id}"><label for="{id}">{label}</label><img class="image-preview" src="{preview}" alt="Pré-visualização"><input type="file" id="{id}" name="{id}" accept="image/*"></div>"#,
        label = html_escape(label),
        preview = html_escape(slot.preview()),
    )
}

fn text_control(id: &str, label: &str, value: &str) -> String {
    format!(
        r#"<div class="form-group"><label for="{id}">{label}</label><input type="text" id="{id}" name="{id}" value="{value}"></div>"#,
        label = html_escape(label),
        value = html_escape(value),
    )
}

/// Homepage edit form over an open session.
pub fn render_homepage_form(session: &HomepageSession) -> String {
    let carousel: String = session
        .carousel()
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            image_control(
                &format!("carousel-{}", i + 1),
                &format!("Imagem {} do carrossel", i + 1),
                slot,
            )
        })
        .collect();

    let buttons: String = session
        .buttons()
        .iter()
        .enumerate()
        .map(|(i, b)| {
            let n = i + 1;
            format!(
                r#"<div class="form-section" data-button="{n}"><h4>Botão {n}</h4>{}{}{}{}</div>"#,
                text_control(&format!("button-{n}-title"), "Título", &b.title),
                text_control(&format!("button-{n}-subtitle"), "Subtítulo", &b.subtitle),
                text_control(&format!("button-{n}-link"), "Link", &b.link),
                image_control(&format!("button-{n}"), "Imagem", &b.image),
            )
        })
        .collect();

    let footer = session.footer();
    format!(
        r#"<form id="homepage-form"><div class="form-section"><h3>Carrossel</h3>{carousel}</div><div class="form-section"><h3>Botões</h3>{buttons}</div><div class="form-section"><h3>Rodapé</h3>{pix}<div class="form-group"><label for="mantimentosList">Mantimentos (um por linha)</label><textarea id="mantimentosList" name="mantimentosList" rows="6">{supplies}</textarea></div>{phone}{address}{facebook}{instagram}{qr}{logo}</div><button type="submit" id="save-changes">Salvar Alterações</button></form>"#,
        pix = text_control("pixText", "Chave PIX", &footer.pix_text),
        supplies = html_escape(session.supplies_text()),
        phone = text_control("contactPhone", "Telefone", &footer.contact_phone),
        address = text_control("address", "Endereço", &footer.address),
        facebook = text_control("socialFacebook", "Facebook", &footer.social_facebook),
        instagram = text_control("socialInstagram", "Instagram", &footer.social_instagram),
        qr = image_control("qr-code", "QR Code PIX", session.qr_code()),
        logo = image_control("logo", "Logo", session.logo()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use shelter_pages_core::homepage::{ActionButton, Footer, HomepageImage};
    use shelter_pages_core::image::ImageUpload;

    fn doc() -> HomepageDocument {
        HomepageDocument {
            carousel_images: vec!["/img/1.jpg".into(), "".into(), "/img/3.jpg".into()],
            action_buttons: vec![
                ActionButton {
                    title: "Adote".into(),
                    subtitle: "Conheça".into(),
                    link: Some("/pages/adocao".into()),
                    img_src: "/img/adote.png".into(),
                },
                ActionButton::default(),
            ],
            footer: Footer {
                pix_text: "pix@ong.example".into(),
                mantimentos_list: vec!["  Ração ".into(), "   ".into(), "Areia".into()],
                address: "Rua A, 10".into(),
                ..Footer::default()
            },
        }
    }

    #[test]
    fn supplies_are_trimmed_and_blank_entries_skipped() {
        assert_eq!(
            render_supplies(&doc().footer.mantimentos_list),
            r#"<div id="mantimentos-modal"><ul><li>Ração</li><li>Areia</li></ul></div>"#
        );
    }

    #[test]
    fn homepage_skips_empty_slots() {
        let html = render_homepage(Some(&doc()));
        assert_eq!(html.matches("alt=\"Slide").count(), 2);
        assert_eq!(html.matches("class=\"action-button\"").count(), 1);
        assert!(html.contains(r#"href="/pages/adocao""#));
        assert!(html.contains("<strong>Endereço:</strong> Rua A, 10"));
    }

    #[test]
    fn missing_document_renders_built_in_layout() {
        let html = render_homepage(None);
        assert!(html.contains("<title>Street to Sweet</title>"));
        assert!(html.contains(r#"<div class="slides"></div>"#));
    }

    #[test]
    fn form_shows_five_slots_and_upload_previews() {
        let mut session = HomepageSession::open(Some(&doc()));
        session
            .choose_image(
                HomepageImage::Carousel(1),
                ImageUpload::new("b.png", None, vec![1]),
                "/preview/carousel-2".into(),
            )
            .unwrap();
        let html = render_homepage_form(&session);
        assert_eq!(html.matches("data-slot=\"carousel-").count(), 5);
        assert_eq!(html.matches("data-button=").count(), 5);
        assert!(html.contains(r#"src="/preview/carousel-2""#));
        assert!(html.contains(">  Ração \n   \nAreia</textarea>"));
    }
}
