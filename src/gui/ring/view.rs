use super::TAU;
use super::model::{Arc, Disc, Label, Point, Ring, Shape};
use cairo::Context;
use palette::Srgba;

fn set_source(cr: &Context, color: Srgba<f64>) {
    let (r, g, b, a) = color.into_components();
    cr.set_source_rgba(r, g, b, a);
}

fn draw_disc(cr: &Context, disc: &Disc) -> Result<(), cairo::Error> {
    cr.new_path();
    cr.arc(disc.center.x, disc.center.y, disc.radius, 0.0, TAU);
    set_source(cr, disc.fill);
    cr.fill_preserve()?;
    set_source(cr, disc.border);
    cr.set_line_width(disc.line_width);
    cr.stroke()
}

fn draw_ring(cr: &Context, ring: &Ring) -> Result<(), cairo::Error> {
    cr.new_path();
    cr.arc(ring.center.x, ring.center.y, ring.radius, 0.0, TAU);
    set_source(cr, ring.stroke);
    cr.set_line_width(ring.line_width);
    cr.stroke()
}

fn draw_arc(cr: &Context, arc: &Arc) -> Result<(), cairo::Error> {
    // cairo would wrap an empty sweep into a full circle
    if arc.end <= arc.start {
        return Ok(());
    }
    cr.new_path();
    cr.arc(arc.center.x, arc.center.y, arc.radius, arc.start, arc.end);
    set_source(cr, arc.stroke);
    cr.set_line_width(arc.line_width);
    cr.stroke()
}

/// Baseline origin that puts the centre of the text's ink box on `center`.
fn label_origin(center: Point, width: f64, height: f64, x_bearing: f64, y_bearing: f64) -> (f64, f64) {
    (
        center.x - width / 2.0 - x_bearing,
        center.y - height / 2.0 - y_bearing,
    )
}

fn draw_label(cr: &Context, label: &Label) -> Result<(), cairo::Error> {
    set_source(cr, label.color);
    cr.select_font_face(
        &label.font_family,
        cairo::FontSlant::Normal,
        cairo::FontWeight::Normal,
    );
    cr.set_font_size(label.font_size);
    let ext = cr.text_extents(&label.text)?;
    let (x, y) = label_origin(
        label.center,
        ext.width(),
        ext.height(),
        ext.x_bearing(),
        ext.y_bearing(),
    );
    cr.move_to(x, y);
    cr.show_text(&label.text)
}

/// Paints `shapes` in order.
pub fn draw(cr: &Context, shapes: &[Shape]) -> Result<(), cairo::Error> {
    for shape in shapes {
        match shape {
            Shape::Disc(disc) => draw_disc(cr, disc)?,
            Shape::Ring(ring) => draw_ring(cr, ring)?,
            Shape::Arc(arc) => draw_arc(cr, arc)?,
            Shape::Label(label) => draw_label(cr, label)?,
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RingConfig;
    use crate::gui::ring::model::{CanvasSize, RenderObjects};
    use cairo::{Format, ImageSurface};

    fn alpha_at(surface: &mut ImageSurface, x: usize, y: usize) -> u8 {
        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        data[y * stride + x * 4 + 3]
    }

    fn render(progress: f64) -> ImageSurface {
        let surface = ImageSurface::create(Format::ARgb32, 100, 100).unwrap();
        let objects = RenderObjects::build(&RingConfig::default(), CanvasSize::new(100.0, 100.0));
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, &objects.display_list(progress)).unwrap();
        }
        surface.flush();
        surface
    }

    #[test]
    fn test_draw_paints_background_inside_outer_radius() {
        let mut surface = render(0.0);
        assert_eq!(alpha_at(&mut surface, 1, 1), 0);
        assert!(alpha_at(&mut surface, 50, 25) > 150);
    }

    #[test]
    fn test_draw_strokes_arc_over_track() {
        let mut objects =
            RenderObjects::build(&RingConfig::default(), CanvasSize::new(100.0, 100.0));
        // clockwise half turn from the top covers the right-hand side only
        objects.progress.end = objects.progress.start + TAU / 2.0;

        let mut surface = ImageSurface::create(Format::ARgb32, 100, 100).unwrap();
        {
            let cr = Context::new(&surface).unwrap();
            draw(&cr, &objects.display_list(0.0)).unwrap();
        }
        surface.flush();

        let stride = surface.stride() as usize;
        let data = surface.data().unwrap();
        let rgb = |x: usize, y: usize| {
            let i = y * stride + x * 4;
            (data[i + 2], data[i + 1])
        };

        let (red, green) = rgb(90, 50);
        assert!(red > green, "progress arc should be red at zero progress");

        let (red, green) = rgb(10, 50);
        assert!(red < green, "left side should only show the grey track");
    }

    #[test]
    fn test_label_origin_centres_ink_box() {
        let center = Point::new(50.0, 50.0);

        // caps sitting on the baseline
        let (x, y) = label_origin(center, 40.0, 30.0, 1.0, -30.0);
        assert_eq!((x, y), (29.0, 65.0));
        assert_eq!(y - 30.0 + 30.0 / 2.0, 50.0);

        // a descender pushes the ink box below the baseline
        let (_, y) = label_origin(center, 40.0, 40.0, 0.0, -30.0);
        assert_eq!(y, 60.0);
        assert_eq!(y - 30.0 + 40.0 / 2.0, 50.0);
    }
}
