use glam::Vec2;
use imgui::Ui;

use crate::camera::Camera;
use crate::showroom::Label;

const LABEL_COLOR: [f32; 4] = [0.29, 0.18, 0.36, 1.0];

/// Draws each caption centered over its anchor, skipping anchors behind the camera.
pub fn draw_labels(ui: &Ui, camera: &Camera, labels: &[Label], viewport: Vec2) {
    let scale = Vec2::from(ui.io().display_framebuffer_scale).max(Vec2::splat(1e-3));
    let draw_list = ui.get_foreground_draw_list();

    for label in labels {
        let Some(screen) = camera.world_to_screen(label.position, viewport) else {
            continue;
        };

        let size = Vec2::from(ui.calc_text_size(&label.text));
        let position = screen / scale - size * 0.5;

        draw_list.add_text(position.to_array(), LABEL_COLOR, &label.text);
    }
}
