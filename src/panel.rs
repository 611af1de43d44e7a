//! The side panel: nearest aircraft headline, a few runners-up and an optional photo.

use tiny_skia::Pixmap;
use usvg::Tree;

use crate::error::{Error, Result};
use crate::image::AircraftImage;
use crate::map::escape_html;
use crate::pipeline::Refresh;

const WIDTH: u32 = 800;
const HEIGHT: u32 = 480;
const RUNNERS_UP: usize = 4;

pub fn render_panel_svg(refresh: &Refresh, image: Option<&AircraftImage>) -> String {
    let Some(nearest) = refresh.nearest() else {
        return render_no_aircraft_svg(refresh);
    };

    let image_layer = match image {
        Some(img) => format!(
            r#"<image href="{}" width="{WIDTH}" height="{HEIGHT}" preserveAspectRatio="xMidYMid slice" />"#,
            img.data_uri()
        ),
        None => String::new(),
    };

    let mut rows = String::new();
    for (i, ac) in refresh.aircraft.iter().skip(1).take(RUNNERS_UP).enumerate() {
        let y = 300 + i * 36;
        rows.push_str(&format!(
            "  <text x='60' y='{y}' font-family='sans-serif' font-size='28' fill='#000000'>{}</text>\n",
            escape_html(ac.label())
        ));
        rows.push_str(&format!(
            "  <text x='740' y='{y}' font-family='sans-serif' font-size='28' text-anchor='end' fill='#000000'>{:.1} km</text>\n",
            ac.distance_km
        ));
    }

    let located = if refresh.located { "" } else { " (location unknown)" };

    format!(
        r#"<svg width='{WIDTH}' height='{HEIGHT}' viewBox='0 0 {WIDTH} {HEIGHT}' xmlns='http://www.w3.org/2000/svg'>
  <rect width='{WIDTH}' height='{HEIGHT}' fill='white' />
  {image_layer}

  <rect x='30' y='20' width='740' height='440' rx='20' fill='white' fill-opacity='0.8' />

  <text x='60' y='70' font-family='sans-serif' font-size='26' fill='#000000'>NEAREST AIRCRAFT</text>
  <text x='60' y='150' font-family='sans-serif' font-size='72' fill='#000000' font-weight='bold'>{label}</text>
  <text x='60' y='210' font-family='sans-serif' font-size='44' fill='#000000'>{distance:.1} km</text>
  <text x='740' y='70' font-family='sans-serif' font-size='22' text-anchor='end' fill='#7f8c8d'>{center}{located}</text>

{rows}</svg>"#,
        label = escape_html(nearest.label()),
        distance = nearest.distance_km,
        center = refresh.center,
    )
}

fn render_no_aircraft_svg(refresh: &Refresh) -> String {
    format!(
        r#"<svg width='{WIDTH}' height='{HEIGHT}' viewBox='0 0 {WIDTH} {HEIGHT}' xmlns='http://www.w3.org/2000/svg'>

  <rect width='{WIDTH}' height='{HEIGHT}' fill='white' />

  <text x='400' y='240' font-family='sans-serif' font-size='40' text-anchor='middle' fill='#7f8c8d'>{}</text>

</svg>"#,
        escape_html(&refresh.summary)
    )
}

pub fn svg_to_png(svg: &str, opt: &usvg::Options) -> Result<Vec<u8>> {
    let tree = Tree::from_str(svg, opt).map_err(|e| Error::Render(e.to_string()))?;

    let size = tree.size();
    let mut pixmap = Pixmap::new(size.width() as u32, size.height() as u32)
        .ok_or_else(|| Error::Render(format!("bad canvas size {size:?}")))?;
    resvg::render(&tree, tiny_skia::Transform::default(), &mut pixmap.as_mut());

    pixmap.encode_png().map_err(|e| Error::Render(e.to_string()))
}
