use imgui::{Condition, TreeNodeFlags, Ui};

use crate::catalog::images::{GalleryImages, ImageSlot};
use crate::catalog::{CatalogSection, Product, ProductCatalog};

const ACCENT: [f32; 4] = [0.71, 0.49, 0.86, 1.0];
const COLUMNS: i32 = 3;

pub fn draw_catalog(ui: &Ui, catalog: &mut ProductCatalog) {
    let mut preview = None;

    ui.window("Bakery Products")
        .position([20.0, 20.0], Condition::FirstUseEver)
        .size([520.0, 640.0], Condition::FirstUseEver)
        .build(|| {
            ui.text_colored(ACCENT, "BAKERY PRODUCTS");
            ui.text("Explore The Categories Of Our Bakery Products");
            if catalog.is_loading() {
                ui.text_disabled("Loading products...");
            }
            ui.separator();

            for section in CatalogSection::ALL {
                if !ui.collapsing_header(section.title(), TreeNodeFlags::DEFAULT_OPEN) {
                    continue;
                }

                let products: Vec<Product> = catalog.section(section).into_iter().cloned().collect();
                if let Some(product) = draw_section(ui, section, &products, &mut catalog.gallery) {
                    preview = Some(product);
                }
            }
        });

    if let Some(product) = preview {
        catalog.open_modal(product);
    }

    draw_modal(ui, catalog);
}

/// One card per product in a grid. Returns the product whose preview was clicked.
fn draw_section(
    ui: &Ui,
    section: CatalogSection,
    products: &[Product],
    gallery: &mut GalleryImages,
) -> Option<Product> {
    let mut clicked = None;

    ui.columns(COLUMNS, section.key(), false);
    let card_width = ui.current_column_width() - 8.0;

    for (index, product) in products.iter().enumerate() {
        let _id = ui.push_id(format!("{}-{index}", section.key()));

        ui.text_colored(ACCENT, product.price.to_string());
        ui.text_wrapped(&product.name);
        ui.text(format!("Size: {}", product.size));

        if let Some(file) = product.cover_image() {
            draw_image(ui, gallery, file, card_width);
        }

        if ui.button("Preview") {
            clicked = Some(product.clone());
        }

        ui.next_column();
    }

    ui.columns(1, section.key(), false);
    ui.spacing();

    clicked
}

fn draw_modal(ui: &Ui, catalog: &mut ProductCatalog) {
    let Some(product) = catalog.modal().product().cloned() else {
        return;
    };

    let mut opened = true;
    let [width, height] = ui.io().display_size;

    ui.window(format!("{}###product-modal", product.name))
        .opened(&mut opened)
        .position([width * 0.5, height * 0.5], Condition::Appearing)
        .position_pivot([0.5, 0.5])
        .size([width.min(800.0) * 0.9, height * 0.8], Condition::Appearing)
        .collapsible(false)
        .focused(true)
        .build(|| {
            ui.text_wrapped(&product.description);
            ui.separator();

            ui.columns(COLUMNS, "gallery", false);
            let image_width = ui.current_column_width() - 8.0;

            for (index, file) in product.image_files().into_iter().enumerate() {
                let _id = ui.push_id(format!("image-{index}"));
                draw_image(ui, &mut catalog.gallery, file, image_width);
                ui.next_column();
            }

            ui.columns(1, "gallery", false);
        });

    if !opened {
        catalog.close_modal();
    }
}

fn draw_image(ui: &Ui, gallery: &mut GalleryImages, file: &str, width: f32) {
    match gallery.get(file) {
        ImageSlot::Ready { texture_id, size } => {
            let width = width.max(1.0);
            let height = width * size[1] / size[0].max(1.0);
            imgui::Image::new(texture_id, [width, height]).build(ui);
        }
        ImageSlot::Loading => ui.text_disabled("Loading..."),
        ImageSlot::Failed => ui.text_disabled(file),
    }
}
