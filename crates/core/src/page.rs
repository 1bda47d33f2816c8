use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Pages of the public site whose content lives under `pages/<name>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PageName {
    #[serde(rename = "adocao")]
    Adocao,
    #[serde(rename = "campanhas")]
    Campanhas,
    #[serde(rename = "trabalhos")]
    Trabalhos,
    #[serde(rename = "paginaInicial")]
    PaginaInicial,
}

impl PageName {
    pub const ALL: [PageName; 4] = [
        PageName::Adocao,
        PageName::Campanhas,
        PageName::Trabalhos,
        PageName::PaginaInicial,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PageName::Adocao => "adocao",
            PageName::Campanhas => "campanhas",
            PageName::Trabalhos => "trabalhos",
            PageName::PaginaInicial => "paginaInicial",
        }
    }

    /// Title and subtitle shown when the content document is missing or blank.
    pub fn default_content(&self) -> PageContent {
        let (title, subtitle) = match self {
            PageName::Adocao => ("Adoção", "Confira os animais disponíveis para adoção!"),
            PageName::Campanhas => (
                "Campanhas de vacinação e castração",
                "Acompanhe as informações acerca das campanhas voltadas à causa animal realizadas pela prefeitura de Santa Rita do Sapucaí.",
            ),
            PageName::Trabalhos => (
                "Trabalhos realizados",
                "A atuação da associação vai muito além! Confira nossas ações!",
            ),
            PageName::PaginaInicial => ("Street to Sweet", ""),
        };
        PageContent {
            title: title.to_string(),
            subtitle: subtitle.to_string(),
        }
    }
}

impl fmt::Display for PageName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown page: {0}")]
pub struct UnknownPage(pub String);

impl FromStr for PageName {
    type Err = UnknownPage;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        PageName::ALL
            .into_iter()
            .find(|page| page.as_str() == s)
            .ok_or_else(|| UnknownPage(s.to_string()))
    }
}

/// Singleton header document of a page (`pages/<name>`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageContent {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub subtitle: String,
}

impl PageContent {
    /// Fill blank fields from the page defaults.
    pub fn or_defaults(self, page: PageName) -> Self {
        let defaults = page.default_content();
        Self {
            title: if self.title.is_empty() {
                defaults.title
            } else {
                self.title
            },
            subtitle: if self.subtitle.is_empty() {
                defaults.subtitle
            } else {
                self.subtitle
            },
        }
    }
}
