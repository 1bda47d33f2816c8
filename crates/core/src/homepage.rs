//! Homepage document (`pages/paginaInicial`) and its edit session.
//!
//! Unlike the other pages the homepage has no item collection: carousel,
//! action buttons and footer all live in one document that is written whole.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::document::DocPath;
use crate::editor::SaveError;
use crate::form::to_data;
use crate::image::{encode_inline, ImageError, ImageUpload};
use crate::page::PageName;
use crate::session::{ImageChoice, SessionError, SessionState};
use crate::store::DocumentStore;

/// Number of carousel images and of action buttons.
pub const MAX_SLOTS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HomepageDocument {
    #[serde(default)]
    pub carousel_images: Vec<String>,
    #[serde(default)]
    pub action_buttons: Vec<ActionButton>,
    #[serde(default)]
    pub footer: Footer,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActionButton {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default)]
    pub img_src: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Footer {
    #[serde(default)]
    pub pix_text: String,
    /// Supplies the association accepts as donations.
    #[serde(default)]
    pub mantimentos_list: Vec<String>,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub social_facebook: String,
    #[serde(default)]
    pub social_instagram: String,
    #[serde(default)]
    pub qr_code_src: String,
    #[serde(default)]
    pub logo_src: String,
}

/// Split the supplies textarea into list entries, dropping blank lines.
pub fn parse_supplies(text: &str) -> Vec<String> {
    text.lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

/// Image control of the homepage form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageSlot {
    pub current: String,
    pub image: ImageChoice,
}

impl ImageSlot {
    fn new(current: String) -> Self {
        Self {
            current,
            image: ImageChoice::Keep,
        }
    }

    pub fn preview(&self) -> &str {
        match &self.image {
            ImageChoice::Keep => &self.current,
            ImageChoice::Upload { preview, .. } => preview,
        }
    }

    pub fn pending_upload(&self) -> Option<&ImageUpload> {
        match &self.image {
            ImageChoice::Keep => None,
            ImageChoice::Upload { upload, .. } => Some(upload),
        }
    }

    fn has_image(&self) -> bool {
        !self.current.trim().is_empty() || matches!(self.image, ImageChoice::Upload { .. })
    }

    async fn resolve(self) -> Result<String, ImageError> {
        match self.image {
            ImageChoice::Keep => Ok(self.current),
            ImageChoice::Upload { upload, .. } => encode_inline(upload).await,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ButtonSlot {
    pub title: String,
    pub subtitle: String,
    pub link: String,
    pub image: ImageSlot,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FooterFields {
    #[serde(default)]
    pub pix_text: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub social_facebook: String,
    #[serde(default)]
    pub social_instagram: String,
}

/// Addresses one image control of the homepage form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HomepageImage {
    Carousel(usize),
    Button(usize),
    QrCode,
    Logo,
}

impl HomepageImage {
    /// Parse a route segment such as `carousel-1`, `button-3`, `qr-code` or `logo`.
    /// Slot numbers are 1-based.
    pub fn parse(raw: &str) -> Option<Self> {
        let slot = |n: &str| {
            n.parse::<usize>()
                .ok()
                .filter(|n| (1..=MAX_SLOTS).contains(n))
                .map(|n| n - 1)
        };
        match raw {
            "qr-code" => Some(HomepageImage::QrCode),
            "logo" => Some(HomepageImage::Logo),
            _ => {
                if let Some(n) = raw.strip_prefix("carousel-") {
                    slot(n).map(HomepageImage::Carousel)
                } else if let Some(n) = raw.strip_prefix("button-") {
                    slot(n).map(HomepageImage::Button)
                } else {
                    None
                }
            }
        }
    }
}

/// Detached homepage save, ready to execute.
#[derive(Debug, Clone, PartialEq)]
pub struct HomepagePlan {
    carousel: Vec<ImageSlot>,
    buttons: Vec<ButtonSlot>,
    footer: FooterFields,
    supplies: Vec<String>,
    qr_code: ImageSlot,
    logo: ImageSlot,
}

#[derive(Debug, Clone)]
pub struct HomepageSession {
    carousel: Vec<ImageSlot>,
    buttons: Vec<ButtonSlot>,
    footer: FooterFields,
    supplies_text: String,
    qr_code: ImageSlot,
    logo: ImageSlot,
    state: SessionState,
}

impl HomepageSession {
    pub fn open(doc: Option<&HomepageDocument>) -> Self {
        let doc = doc.cloned().unwrap_or_default();

        let mut carousel: Vec<ImageSlot> = doc
            .carousel_images
            .into_iter()
            .take(MAX_SLOTS)
            .map(ImageSlot::new)
            .collect();
        carousel.resize(MAX_SLOTS, ImageSlot::new(String::new()));

        let mut buttons: Vec<ButtonSlot> = doc
            .action_buttons
            .into_iter()
            .take(MAX_SLOTS)
            .map(|b| ButtonSlot {
                title: b.title,
                subtitle: b.subtitle,
                link: b.link.unwrap_or_default(),
                image: ImageSlot::new(b.img_src),
            })
            .collect();
        buttons.resize(
            MAX_SLOTS,
            ButtonSlot {
                title: String::new(),
                subtitle: String::new(),
                link: String::new(),
                image: ImageSlot::new(String::new()),
            },
        );

        let footer = doc.footer;
        Self {
            carousel,
            buttons,
            footer: FooterFields {
                pix_text: footer.pix_text,
                contact_phone: footer.contact_phone,
                address: footer.address,
                social_facebook: footer.social_facebook,
                social_instagram: footer.social_instagram,
            },
            supplies_text: footer.mantimentos_list.join("\n"),
            qr_code: ImageSlot::new(footer.qr_code_src),
            logo: ImageSlot::new(footer.logo_src),
            state: SessionState::Editing,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn carousel(&self) -> &[ImageSlot] {
        &self.carousel
    }

    pub fn buttons(&self) -> &[ButtonSlot] {
        &self.buttons
    }

    pub fn footer(&self) -> &FooterFields {
        &self.footer
    }

    pub fn supplies_text(&self) -> &str {
        &self.supplies_text
    }

    pub fn qr_code(&self) -> &ImageSlot {
        &self.qr_code
    }

    pub fn logo(&self) -> &ImageSlot {
        &self.logo
    }

    pub fn image_slot(&self, target: HomepageImage) -> Option<&ImageSlot> {
        match target {
            HomepageImage::Carousel(i) => self.carousel.get(i),
            HomepageImage::Button(i) => self.buttons.get(i).map(|b| &b.image),
            HomepageImage::QrCode => Some(&self.qr_code),
            HomepageImage::Logo => Some(&self.logo),
        }
    }

    fn ensure_editable(&self) -> Result<(), SessionError> {
        match self.state {
            SessionState::Editing => Ok(()),
            SessionState::Saving => Err(SessionError::SaveInProgress),
            SessionState::Saved => Err(SessionError::Closed),
        }
    }

    /// Update one action button; `index` is 0-based.
    pub fn set_button(
        &mut self,
        index: usize,
        title: String,
        subtitle: String,
        link: String,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let button = self
            .buttons
            .get_mut(index)
            .ok_or_else(|| SessionError::UnknownKey(format!("button-{}", index + 1)))?;
        button.title = title;
        button.subtitle = subtitle;
        button.link = link;
        Ok(())
    }

    pub fn set_footer(&mut self, footer: FooterFields) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.footer = footer;
        Ok(())
    }

    /// Replace the supplies textarea (one entry per line).
    pub fn set_supplies(&mut self, text: String) -> Result<(), SessionError> {
        self.ensure_editable()?;
        self.supplies_text = text;
        Ok(())
    }

    pub fn choose_image(
        &mut self,
        target: HomepageImage,
        upload: ImageUpload,
        preview: String,
    ) -> Result<(), SessionError> {
        self.ensure_editable()?;
        let slot = match target {
            HomepageImage::Carousel(i) => self.carousel.get_mut(i),
            HomepageImage::Button(i) => self.buttons.get_mut(i).map(|b| &mut b.image),
            HomepageImage::QrCode => Some(&mut self.qr_code),
            HomepageImage::Logo => Some(&mut self.logo),
        }
        .ok_or_else(|| SessionError::UnknownKey(format!("{target:?}")))?;
        slot.image = ImageChoice::Upload { upload, preview };
        Ok(())
    }

    /// Check the form and switch to `Saving`. The first carousel slot must
    /// hold an image, either the current one or a new upload.
    pub fn begin_save(&mut self) -> Result<HomepagePlan, SessionError> {
        self.ensure_editable()?;
        if !self.carousel.first().is_some_and(ImageSlot::has_image) {
            return Err(SessionError::MissingFirstCarouselImage);
        }
        self.state = SessionState::Saving;
        Ok(HomepagePlan {
            carousel: self.carousel.clone(),
            buttons: self.buttons.clone(),
            footer: self.footer.clone(),
            supplies: parse_supplies(&self.supplies_text),
            qr_code: self.qr_code.clone(),
            logo: self.logo.clone(),
        })
    }

    pub fn finish_save(&mut self, succeeded: bool) {
        self.state = if succeeded {
            SessionState::Saved
        } else {
            SessionState::Editing
        };
    }
}

/// Loads and saves the homepage document.
#[derive(Clone)]
pub struct HomepageEditor {
    store: Arc<dyn DocumentStore>,
}

impl HomepageEditor {
    pub fn new(store: Arc<dyn DocumentStore>) -> Self {
        Self { store }
    }

    /// `None` when the document is missing, unreadable or undecodable.
    pub async fn load(&self) -> Option<HomepageDocument> {
        match self.store.get(&DocPath::page(PageName::PaginaInicial)).await {
            Ok(Some(doc)) => {
                match serde_json::from_value::<HomepageDocument>(serde_json::Value::Object(doc.data)) {
                    Ok(home) => Some(home),
                    Err(e) => {
                        tracing::warn!(error = %e, "homepage document does not decode");
                        None
                    }
                }
            }
            Ok(None) => {
                tracing::info!("homepage document not found, using built-in content");
                None
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to load homepage document");
                None
            }
        }
    }

    pub async fn save(&self, session: &mut HomepageSession) -> Result<HomepageDocument, SaveError> {
        let plan = session.begin_save()?;
        let outcome = self.execute(plan).await;
        session.finish_save(outcome.is_ok());
        outcome
    }

    /// Resolve every image slot in form order and write the whole document.
    pub async fn execute(&self, plan: HomepagePlan) -> Result<HomepageDocument, SaveError> {
        let mut carousel_images = Vec::with_capacity(MAX_SLOTS);
        for slot in plan.carousel {
            carousel_images.push(slot.resolve().await?);
        }

        let mut action_buttons = Vec::with_capacity(MAX_SLOTS);
        for button in plan.buttons {
            action_buttons.push(ActionButton {
                title: button.title,
                subtitle: button.subtitle,
                link: Some(button.link),
                img_src: button.image.resolve().await?,
            });
        }

        let footer = Footer {
            pix_text: plan.footer.pix_text,
            mantimentos_list: plan.supplies,
            contact_phone: plan.footer.contact_phone,
            address: plan.footer.address,
            social_facebook: plan.footer.social_facebook,
            social_instagram: plan.footer.social_instagram,
            qr_code_src: plan.qr_code.resolve().await?,
            logo_src: plan.logo.resolve().await?,
        };

        let doc = HomepageDocument {
            carousel_images,
            action_buttons,
            footer,
        };

        self.store
            .set(&DocPath::page(PageName::PaginaInicial), to_data(&doc))
            .await
            .map_err(|e| {
                tracing::error!(error = %e, "failed to save homepage");
                SaveError::Store(e)
            })?;

        tracing::info!("homepage saved");
        Ok(doc)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image::InlineImage;
    use crate::store::MemoryStore;

    fn stored_home() -> HomepageDocument {
        HomepageDocument {
            carousel_images: vec!["/img/slide1.jpg".into(), "/img/slide2.jpg".into()],
            action_buttons: vec![ActionButton {
                title: "Adote".into(),
                subtitle: "Conheça os animais".into(),
                link: Some("adocao.html".into()),
                img_src: "/img/adote.png".into(),
            }],
            footer: Footer {
                pix_text: "pix@example.org".into(),
                mantimentos_list: vec!["Ração".into(), "Areia".into()],
                contact_phone: "(35) 99999-0000".into(),
                ..Footer::default()
            },
        }
    }

    #[test]
    fn open_pads_slots_to_five() {
        let session = HomepageSession::open(Some(&stored_home()));
        assert_eq!(session.carousel().len(), MAX_SLOTS);
        assert_eq!(session.buttons().len(), MAX_SLOTS);
        assert_eq!(session.carousel()[1].preview(), "/img/slide2.jpg");
        assert_eq!(session.buttons()[0].link, "adocao.html");
        assert_eq!(session.supplies_text(), "Ração\nAreia");
    }

    #[test]
    fn supplies_drop_blank_lines() {
        assert_eq!(
            parse_supplies("Ração\n\n  \r\nAreia\r\nJornal"),
            vec!["Ração", "Areia", "Jornal"]
        );
    }

    #[test]
    fn image_targets_parse_one_based_slots() {
        assert_eq!(HomepageImage::parse("carousel-1"), Some(HomepageImage::Carousel(0)));
        assert_eq!(HomepageImage::parse("button-5"), Some(HomepageImage::Button(4)));
        assert_eq!(HomepageImage::parse("qr-code"), Some(HomepageImage::QrCode));
        assert_eq!(HomepageImage::parse("carousel-6"), None);
        assert_eq!(HomepageImage::parse("carousel-0"), None);
    }

    #[test]
    fn first_carousel_image_is_required() {
        let mut empty = HomepageSession::open(None);
        assert_eq!(
            empty.begin_save(),
            Err(SessionError::MissingFirstCarouselImage)
        );

        empty
            .choose_image(
                HomepageImage::Carousel(0),
                ImageUpload::new("a.png", None, vec![1]),
                "/preview".into(),
            )
            .unwrap();
        assert!(empty.begin_save().is_ok());
        assert_eq!(empty.begin_save(), Err(SessionError::SaveInProgress));
    }

    #[tokio::test]
    async fn save_writes_full_document_with_inline_uploads() {
        let store = Arc::new(MemoryStore::new());
        let editor = HomepageEditor::new(store.clone());
        let mut session = HomepageSession::open(Some(&stored_home()));
        session
            .set_button(1, "Doe".into(), "Ajude".into(), "doacao.html".into())
            .unwrap();
        session.set_supplies("Ração\n\nCobertores".into()).unwrap();
        session
            .choose_image(
                HomepageImage::Logo,
                ImageUpload::new("logo.png", Some("image/png".into()), vec![9, 9]),
                "/preview/logo".into(),
            )
            .unwrap();

        let saved = editor.save(&mut session).await.unwrap();
        assert_eq!(session.state(), SessionState::Saved);
        assert_eq!(saved.carousel_images.len(), MAX_SLOTS);
        assert_eq!(saved.carousel_images[0], "/img/slide1.jpg");
        assert_eq!(saved.carousel_images[4], "");
        assert_eq!(saved.action_buttons.len(), MAX_SLOTS);
        assert_eq!(saved.action_buttons[1].title, "Doe");
        assert_eq!(saved.footer.mantimentos_list, vec!["Ração", "Cobertores"]);
        assert_eq!(InlineImage::parse(&saved.footer.logo_src).unwrap().bytes, vec![9, 9]);

        assert_eq!(editor.load().await, Some(saved));
    }

    #[tokio::test]
    async fn failed_write_reopens_session() {
        let store = Arc::new(MemoryStore::new());
        store.fail_writes_under("pages/paginaInicial").await;
        let editor = HomepageEditor::new(store.clone());
        let mut session = HomepageSession::open(Some(&stored_home()));

        assert!(matches!(editor.save(&mut session).await, Err(SaveError::Store(_))));
        assert_eq!(session.state(), SessionState::Editing);
        assert_eq!(session.footer().pix_text, "pix@example.org");
    }

    #[tokio::test]
    async fn unreadable_homepage_loads_as_none() {
        let store = Arc::new(MemoryStore::new());
        let editor = HomepageEditor::new(store.clone());
        assert_eq!(editor.load().await, None);
        store.fail_reads(true).await;
        assert_eq!(editor.load().await, None);
    }
}
