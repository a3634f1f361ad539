use crate::{
    catalog::{view::draw_catalog, ProductCatalog},
    labels::draw_labels,
    rendering::renderer::Renderer,
    showroom::Showroom,
};

/// Advances the showroom by one frame and builds this frame's UI.
pub fn update(
    showroom: &mut Showroom,
    catalog: Option<&mut ProductCatalog>,
    renderer: &mut Renderer,
    ui: &imgui::Ui,
) {
    showroom.update(ui.io().want_capture_mouse);

    if let Some(catalog) = catalog {
        catalog.poll(renderer);
        draw_catalog(ui, catalog);
    }

    draw_labels(ui, &showroom.camera, showroom.labels(), showroom.viewport());
}
