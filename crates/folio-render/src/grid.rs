//! Grid sections built from CMS-managed grid elements.

use folio_core::{GridElement, GridSection, SectionKind, config::GridConfig};
use tracing::debug;

use crate::{
    cards::render_card,
    template::{TemplateRegistry, TemplateTag},
};

/// Published elements of one grid section, sorted by `order`.
#[derive(Debug)]
pub struct GridGroup<'a> {
    pub section: &'a GridSection,
    pub elements: Vec<&'a GridElement>,
}

impl GridGroup<'_> {
    /// Selector of the container the cards go into.
    ///
    /// A container selector carried by the first element overrides the configured one.
    pub fn target_selector(&self) -> String {
        let container = self
            .elements
            .first()
            .map(|e| e.container_selector.trim())
            .filter(|c| !c.is_empty())
            .unwrap_or(self.section.container.as_str());
        format!("#{} {container}", self.section.id)
    }

    /// Template for this section's cards.
    pub fn template(&self) -> TemplateTag {
        TemplateTag::parse(&self.section.template)
    }

    /// Render every card in order.
    pub fn render(&self, templates: &TemplateRegistry) -> String {
        let tag = self.template();
        self.elements
            .iter()
            .map(|element| render_card(*element, tag, templates))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Whether a section id names a grid section or a fixed one.
pub fn section_kind(grid: &GridConfig, section_id: &str) -> SectionKind {
    if grid.is_grid(section_id) {
        SectionKind::Grid
    } else {
        SectionKind::Fixed
    }
}

/// Container selector for a section: `#<id> <container>`.
pub fn section_target(section: &GridSection) -> String {
    format!("#{} {}", section.id, section.container)
}

/// Group published elements by grid section, in configuration order.
///
/// Elements of unknown sections are dropped. Sections without elements are omitted.
pub fn group_grid_elements<'a>(
    elements: &'a [GridElement],
    grid: &'a GridConfig,
) -> Vec<GridGroup<'a>> {
    grid.sections
        .iter()
        .filter_map(|section| {
            let mut members: Vec<&GridElement> = elements
                .iter()
                .filter(|e| e.published && e.section_id == section.id)
                .collect();
            if members.is_empty() {
                return None;
            }
            members.sort_by_key(|e| e.order);
            debug!(section = %section.id, count = members.len(), "grid section grouped");
            Some(GridGroup {
                section,
                elements: members,
            })
        })
        .collect()
}
