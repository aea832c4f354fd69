//! The copy of "5 Prompts IA pour Entrepreneurs Pressés".
//!
//! All text is inline. Paragraphs use the markup understood by
//! [`parse_markup`](crate::richtext::parse_markup); prompt texts are literal and keep their
//! `**...**` markers because readers paste them into a chat assistant as-is.

use std::fmt;

use crate::model::{Block, Cover, Guide, Section, TableBlock, TableShapeError};
use crate::richtext::ParseError;
use crate::style::StyleName;

/// PDF metadata title.
pub const GUIDE_TITLE: &str = "5 Prompts IA pour Entrepreneurs Pressés";

/// Default output location, relative to the working directory.
pub const DEFAULT_OUTPUT_PATH: &str = "public/guides/5-prompts-ia-entrepreneurs-presses.pdf";

const SMALL_GAP_CM: f64 = 0.3;

/// Brand orange used for the promo code.
const ACCENT_HEX: &str = "#FF6B35";

/// Errors raised while assembling the guide from its copy.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ContentError {
    /// A paragraph holds malformed markup.
    Markup(ParseError),
    /// A table row does not match the table header.
    Table(TableShapeError),
}

impl From<ParseError> for ContentError {
    fn from(err: ParseError) -> Self {
        Self::Markup(err)
    }
}

impl From<TableShapeError> for ContentError {
    fn from(err: TableShapeError) -> Self {
        Self::Table(err)
    }
}

impl fmt::Display for ContentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Markup(_) => write!(f, "invalid markup in the guide copy"),
            Self::Table(_) => write!(f, "malformed table in the guide copy"),
        }
    }
}

impl std::error::Error for ContentError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Markup(err) => Some(err),
            Self::Table(err) => Some(err),
        }
    }
}

/// One ready-to-use prompt with its presentation copy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Prompt {
    pub icon: &'static str,
    pub title: &'static str,
    pub use_case: &'static str,
    pub text: &'static str,
    /// Time-saving line, in markup, icon included.
    pub time_saving: &'static str,
    /// Short saving figure used by the recap table.
    pub saving_summary: &'static str,
}

impl Prompt {
    /// Heading shown at the top of the prompt page.
    pub fn heading(&self, number: usize) -> String {
        format!("{} Prompt {} : {}", self.icon, number, self.title)
    }

    fn section(&self, number: usize) -> Result<Section, ParseError> {
        Ok(Section::builder(self.heading(number))
            .identifier(Some(format!("prompt-{number}")))
            .start_on_new_page(true)
            .push_block(Block::markup(
                StyleName::Body,
                &format!("**Cas d'usage** : {}", self.use_case),
            )?)
            .push_block(Block::spacer_cm(SMALL_GAP_CM))
            .push_block(Block::markup(StyleName::Subsection, "**Le Prompt :**")?)
            .push_block(Block::code(self.text))
            .push_block(Block::spacer_cm(SMALL_GAP_CM))
            .push_block(Block::markup(StyleName::Highlight, self.time_saving)?)
            .build())
    }
}

const EMAIL_PROMPT: &str = "Je dois envoyer un email professionnel avec le contexte suivant :

Destinataire : [Ex: un prospect intéressé par mes services]
Objectif : [Ex: le convaincre de réserver un appel découverte]
Ton souhaité : [Ex: professionnel mais chaleureux]
Éléments clés à inclure : [Ex: notre expertise depuis 5 ans, témoignage client, disponibilités cette semaine]

Rédige un email de 150-200 mots maximum, avec :
- Un objet accrocheur
- Une introduction personnalisée
- Un call-to-action clair
- Une signature professionnelle

Propose 2 versions : une plus formelle et une plus décontractée.";

const LINKEDIN_PROMPT: &str = "Crée un post LinkedIn engageant sur le sujet suivant :

Thème : [Ex: mon retour d'expérience sur l'automatisation de mon business]
Message principal : [Ex: j'ai gagné 15h/semaine en automatisant 3 tâches clés]
Public cible : [Ex: entrepreneurs solo et TPE]
Ton : [Ex: inspirant mais humble, storytelling]

Structure souhaitée :
1. Accroche forte (première ligne)
2. Contexte ou problème (2-3 lignes)
3. Solution ou action prise (développement)
4. Résultat concret avec chiffres
5. Question ou call-to-action pour engager

Longueur : 150-200 mots maximum
Ajoute 3-5 emojis pertinents mais sans en abuser
Propose 3 hashtags stratégiques";

const MEETING_PROMPT: &str = "Voici mes notes brutes d'une réunion :

[Collez vos notes ici, même désorganisées]

Transforme ces notes en compte-rendu structuré avec :

1. **Contexte** (1 phrase) : De quoi parlait cette réunion ?
2. **Participants** : Liste des personnes présentes
3. **Décisions prises** : Points validés (bullet points)
4. **Actions à réaliser** : Format tableau avec 4 colonnes :
   - Action
   - Responsable
   - Deadline
   - Priorité (Haute/Moyenne/Basse)
5. **Points en suspens** : Questions restées sans réponse
6. **Date prochaine réunion** (si mentionnée)

Ton : professionnel et synthétique
Format : prêt à être envoyé par email ou partagé sur Notion";

const MARKET_PROMPT: &str = "Je veux analyser le marché suivant :

Secteur : [Ex: coaching business pour entrepreneurs]
Zone géographique : [Ex: France]
Mon positionnement : [Ex: coaching + outils IA pour automatiser]

Fournis-moi une analyse structurée avec :

1. **Taille du marché** : Chiffres clés et tendances 2024-2025
2. **Concurrents principaux** : 5 acteurs majeurs avec leur positionnement
3. **Opportunités identifiées** : 3 angles d'attaque peu exploités
4. **Menaces potentielles** : Risques à anticiper
5. **Tendances émergentes** : Ce qui va exploser en 2025
6. **Pricing moyen** : Fourchettes de prix pratiquées
7. **Recommandations** : 3 actions prioritaires pour se différencier

Format : synthétique mais précis, avec sources si possible
Ton : analytique et orienté action";

const PLANNING_PROMPT: &str = "Voici toutes mes tâches et objectifs pour la semaine :

[Listez tout en vrac : tâches urgentes, projets en cours, deadlines, réunions prévues]

Aide-moi à organiser ma semaine de manière optimale :

1. **Priorisation** : Classe ces tâches selon la matrice Eisenhower
   - Urgent + Important
   - Important mais pas urgent
   - Urgent mais pas important
   - Ni urgent ni important (à déléguer ou supprimer)

2. **Planning jour par jour** : Répartis les tâches sur 5 jours avec :
   - Maximum 3 tâches prioritaires par jour
   - Temps estimé pour chaque tâche
   - Blocs de temps dédiés (Deep Work le matin, Admin l'après-midi)

3. **Recommandations** :
   - Quelles tâches déléguer ou automatiser ?
   - Quelles tâches peuvent attendre la semaine prochaine ?
   - Où bloquer du temps pour l'imprévu ?

Format : tableau clair et actionnable
Ton : coach bienveillant mais exigeant";

const PROMPTS: [Prompt; 5] = [
    Prompt {
        icon: "🚀",
        title: "Rédaction d'emails professionnels en 30 secondes",
        use_case: "Réponses clients, emails de prospection, relances, négociations",
        text: EMAIL_PROMPT,
        time_saving: "**📈 Gain de temps** : 15-20 minutes par email → **5h économisées par mois**",
        saving_summary: "5h par mois",
    },
    Prompt {
        icon: "📱",
        title: "Création de posts LinkedIn/réseaux sociaux",
        use_case: "Visibilité, personal branding, engagement communauté",
        text: LINKEDIN_PROMPT,
        time_saving: "**📈 Gain de temps** : 30-45 minutes par post → **3h économisées par mois**",
        saving_summary: "3h par mois",
    },
    Prompt {
        icon: "📝",
        title: "Résumé de réunions et compte-rendus",
        use_case: "Transformer vos notes de réunion en actions concrètes",
        text: MEETING_PROMPT,
        time_saving:
            "**📈 Gain de temps** : 20-30 minutes par réunion → **4h économisées par mois**",
        saving_summary: "4h par mois",
    },
    Prompt {
        icon: "🔍",
        title: "Analyse de marché express",
        use_case: "Étudier la concurrence, identifier des tendances, valider une idée",
        text: MARKET_PROMPT,
        time_saving:
            "**📈 Gain de temps** : 2-3h de recherche manuelle → **8h économisées par analyse**",
        saving_summary: "8h par analyse",
    },
    Prompt {
        icon: "📅",
        title: "Planification de semaine optimisée",
        use_case: "Prioriser, organiser, ne plus se sentir débordé",
        text: PLANNING_PROMPT,
        time_saving:
            "**📈 Gain de temps** : 1-2h de planification brouillon → **5h économisées par semaine**",
        saving_summary: "5h par semaine",
    },
];

/// The five prompts, in presentation order.
pub fn prompts() -> &'static [Prompt] {
    &PROMPTS
}

const BENEFITS: [&str; 5] = [
    "✅ Analyse votre marché automatiquement",
    "✅ Génère votre contenu marketing",
    "✅ Planifie votre stratégie semaine par semaine",
    "✅ Crée votre site web et vos landing pages",
    "✅ Suit vos concurrents et détecte les opportunités",
];

/// Content switches.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ContentOptions {
    /// Adds a page with a table summarising the time saved by each prompt.
    pub summary_table: bool,
}

fn cover() -> Result<Cover, ParseError> {
    Ok(Cover::new(["5 Prompts IA", "pour Entrepreneurs Pressés"])
        .with_subtitle(Some(
            "Gagnez 10h par semaine en automatisant\nvos tâches répétitives".to_owned(),
        ))
        .with_block(Block::markup(
            StyleName::Highlight,
            "🎁 **Guide exclusif offert aux participants du webinaire Ezia.ai**",
        )?))
}

fn introduction() -> Result<Section, ParseError> {
    Ok(Section::builder("📖 Comment utiliser ce guide ?")
        .identifier(Some("introduction".to_owned()))
        .start_on_new_page(true)
        .push_block(Block::markup(
            StyleName::Body,
            "Chaque prompt est **prêt à l'emploi**. Copiez-collez le dans ChatGPT, Claude ou \
             votre IA préférée, remplacez les parties entre [crochets] par vos informations, et \
             laissez l'IA travailler pour vous.",
        )?)
        .push_block(Block::markup(
            StyleName::Highlight,
            "**💡 Astuce** : Enregistrez ces prompts dans vos favoris ou créez un document de \
             référence pour y accéder rapidement.",
        )?)
        .build())
}

fn summary() -> Result<Section, TableShapeError> {
    let mut table = TableBlock::new(["Prompt", "Temps économisé"]).with_column_weights(vec![3, 1]);
    for (index, prompt) in prompts().iter().enumerate() {
        table.push_row([
            format!("{}. {}", index + 1, prompt.title),
            prompt.saving_summary.to_owned(),
        ])?;
    }

    Ok(Section::builder("📊 Récapitulatif des gains de temps")
        .identifier(Some("recapitulatif".to_owned()))
        .start_on_new_page(true)
        .push_block(Block::spacer_cm(SMALL_GAP_CM))
        .push_block(Block::Table(table))
        .build())
}

fn bonus() -> Result<Section, ParseError> {
    Ok(Section::builder("🎁 BONUS : Comment personnaliser ces prompts ?")
        .identifier(Some("bonus".to_owned()))
        .start_on_new_page(true)
        .push_block(Block::markup(
            StyleName::Body,
            "**3 astuces pour des résultats encore meilleurs :**",
        )?)
        .push_block(Block::spacer_cm(SMALL_GAP_CM))
        .push_block(Block::markup(
            StyleName::Body,
            "**1. Soyez hyper-précis** : Plus vous donnez de contexte, meilleur sera le résultat\n\
             ❌ \"Rédige un email\"\n\
             ✅ \"Rédige un email de relance pour un prospect qui a téléchargé mon lead magnet \
             il y a 3 jours mais n'a pas répondu\"",
        )?)
        .push_block(Block::spacer_cm(SMALL_GAP_CM))
        .push_block(Block::markup(
            StyleName::Body,
            "**2. Ajoutez des exemples** : Montrez à l'IA ce que vous aimez\n\
             \"Voici un email que j'aime : [exemple]. Inspire-toi de ce ton.\"",
        )?)
        .push_block(Block::spacer_cm(SMALL_GAP_CM))
        .push_block(Block::markup(
            StyleName::Body,
            "**3. Itérez** : Si le premier résultat n'est pas parfait, demandez des ajustements\n\
             \"Rends cette version plus chaleureuse\"\n\
             \"Ajoute des chiffres concrets\"\n\
             \"Raccourcis à 100 mots maximum\"",
        )?)
        .push_block(Block::spacer_cm(1.0))
        .build())
}

fn call_to_action() -> Result<Section, ParseError> {
    let mut blocks = vec![
        Block::markup(
            StyleName::Body,
            "Ces 5 prompts peuvent vous faire **gagner 10h par semaine**.",
        )?,
        Block::markup(
            StyleName::Body,
            "Mais imaginez si vous aviez un **copilote IA qui connaît votre business par cœur** \
             et automatise ces tâches pour vous, sans même avoir à copier-coller des prompts...",
        )?,
        Block::spacer_cm(0.5),
        Block::markup(
            StyleName::Highlight,
            "**C'est exactement ce que fait Ezia.** 🤖",
        )?,
        Block::spacer_cm(SMALL_GAP_CM),
    ];
    for benefit in BENEFITS {
        blocks.push(Block::markup(StyleName::Body, benefit)?);
    }
    blocks.extend([
        Block::spacer_cm(1.0),
        Block::markup(
            StyleName::Subsection,
            "🎯 Offre exclusive participants webinaire",
        )?,
        Block::markup(
            StyleName::Highlight,
            &format!(
                "**Code promo : [color={ACCENT_HEX}]{{EARLYBIRD30}}**\n\
                 **-30% sur votre abonnement Ezia**\n\
                 **Valable 3 mois après le webinaire**"
            ),
        )?,
        Block::spacer_cm(0.5),
        Block::markup(
            StyleName::Body,
            "👉 **Rejoignez la waiting list VIP** : ezia.ai/waiting-list",
        )?,
        Block::markup(
            StyleName::Body,
            "Accès prioritaire au lancement + support dédié.",
        )?,
        Block::spacer_cm(1.0),
        Block::markup(
            StyleName::Body,
            "**Questions ?** Contactez-nous : hello@ezia.ai",
        )?,
    ]);

    Ok(Section::new("🚀 Prêt à aller plus loin ?")
        .with_identifier(Some("offre".to_owned()))
        .with_blocks(blocks))
}

/// Builds the complete guide.
pub fn lead_magnet_guide(options: &ContentOptions) -> Result<Guide, ContentError> {
    let mut guide = Guide::new(GUIDE_TITLE, cover()?).with_section(introduction()?);
    for (index, prompt) in prompts().iter().enumerate() {
        guide = guide.with_section(prompt.section(index + 1)?);
    }
    if options.summary_table {
        guide = guide.with_section(summary()?);
    }
    Ok(guide
        .with_section(bonus()?)
        .with_section(call_to_action()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StoryItem;

    #[test]
    fn guide_has_intro_prompts_bonus_and_offer() {
        let guide = lead_magnet_guide(&ContentOptions::default()).expect("copy parses");
        let titles: Vec<&str> = guide.sections().iter().map(Section::title).collect();
        assert_eq!(titles.len(), 8);
        assert_eq!(titles[0], "📖 Comment utiliser ce guide ?");
        assert_eq!(titles[1], "🚀 Prompt 1 : Rédaction d'emails professionnels en 30 secondes");
        assert_eq!(titles[5], "📅 Prompt 5 : Planification de semaine optimisée");
        assert_eq!(titles[7], "🚀 Prêt à aller plus loin ?");
    }

    #[test]
    fn summary_table_is_opt_in() {
        let guide = lead_magnet_guide(&ContentOptions {
            summary_table: true,
        })
        .expect("copy parses");
        assert_eq!(guide.sections().len(), 9);

        let table = guide.sections()[6]
            .blocks()
            .iter()
            .find_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .expect("recap table present");
        assert_eq!(table.rows().len(), 5);
        assert_eq!(table.rows()[3][1], "8h par analyse");
    }

    #[test]
    fn every_page_but_the_offer_starts_on_a_new_page() {
        let guide = lead_magnet_guide(&ContentOptions::default()).expect("copy parses");
        let (offer, rest) = guide.sections().split_last().expect("sections present");
        assert!(rest
            .iter()
            .all(|section| matches!(section.blocks().first(), Some(Block::PageBreak))));
        assert!(!matches!(offer.blocks().first(), Some(Block::PageBreak)));
    }

    #[test]
    fn prompt_texts_are_kept_literal() {
        let guide = lead_magnet_guide(&ContentOptions::default()).expect("copy parses");
        let code = guide.sections()[3]
            .blocks()
            .iter()
            .find_map(|block| match block {
                Block::Code(text) => Some(text.as_str()),
                _ => None,
            })
            .expect("prompt block present");
        assert!(code.contains("1. **Contexte** (1 phrase)"));
        assert!(code.contains("\n   - Responsable\n"));
    }

    #[test]
    fn promo_code_is_highlighted_in_accent_color() {
        let guide = lead_magnet_guide(&ContentOptions::default()).expect("copy parses");
        let story = guide.story();
        let offer = story
            .iter()
            .find_map(|item| match item {
                StoryItem::Block(Block::Paragraph(p)) if p.plain_text().contains("EARLYBIRD30") => {
                    Some(p)
                }
                _ => None,
            })
            .expect("offer paragraph present");
        let code = offer
            .spans()
            .iter()
            .find(|span| span.text() == "EARLYBIRD30")
            .expect("promo code span");
        assert!(code.is_bold());
        assert!(code.color().is_some());
        assert_eq!(offer.style(), StyleName::Highlight);
    }

    #[test]
    fn story_starts_with_cover_spacer_and_has_one_marker_per_section() {
        let guide = lead_magnet_guide(&ContentOptions::default()).expect("copy parses");
        let story = guide.story();
        assert!(matches!(story[0], StoryItem::Block(Block::Spacer(_))));
        let markers = story
            .iter()
            .filter(|item| matches!(item, StoryItem::SectionStart(_)))
            .count();
        assert_eq!(markers, guide.sections().len());
    }

    #[test]
    fn time_saving_icon_sits_inside_the_bold_label() {
        for (index, prompt) in prompts().iter().enumerate() {
            let section = prompt.section(index + 1).expect("prompt parses");
            let highlight = section
                .blocks()
                .iter()
                .find_map(|block| match block {
                    Block::Paragraph(p) if p.style() == StyleName::Highlight => Some(p),
                    _ => None,
                })
                .expect("time-saving box present");
            let label = &highlight.spans()[0];
            assert_eq!(label.text(), "📈 Gain de temps");
            assert!(label.is_bold());
        }
    }

    #[test]
    fn recap_rows_match_the_header() {
        let section = summary().expect("recap table builds");
        let table = section
            .blocks()
            .iter()
            .find_map(|block| match block {
                Block::Table(table) => Some(table),
                _ => None,
            })
            .expect("recap table present");
        assert_eq!(table.rows()[0][0], "1. Rédaction d'emails professionnels en 30 secondes");
        assert!(table.rows().iter().all(|row| row.len() == table.header().len()));
    }

    #[test]
    fn content_errors_expose_their_cause() {
        use std::error::Error;

        let err = ContentError::from(TableBlock::new(["a", "b"]).push_row(["only one"]).unwrap_err());
        assert!(err.source().is_some());
        assert_eq!(err.to_string(), "malformed table in the guide copy");
    }
}
