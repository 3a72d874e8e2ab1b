use viewer_core::RenderedPage;

/// CSS pixels per typographic point.
const PX_PER_PT: f32 = 96.0 / 72.0;

#[derive(Debug, thiserror::Error)]
pub enum MeasureError {
    #[error("page markup is not well-formed: {0}")]
    Parse(#[from] roxmltree::Error),
    #[error("expected an <svg> root element, found <{0}>")]
    NotSvg(String),
    #[error("page has no usable width/height")]
    MissingSize,
}

/// Measure a page rendered as a standalone SVG document.
///
/// Size comes from the root `width`/`height` attributes (`px`, `pt` or
/// unitless), falling back to the `viewBox` when either is missing.
pub fn measure_svg(markup: &str) -> Result<RenderedPage, MeasureError> {
    let document = roxmltree::Document::parse(markup)?;
    let root = document.root_element();

    let name = root.tag_name().name();
    if name != "svg" {
        return Err(MeasureError::NotSvg(name.to_owned()));
    }

    let attribute_size = root
        .attribute("width")
        .and_then(parse_length)
        .zip(root.attribute("height").and_then(parse_length));

    let (width, height) = attribute_size
        .or_else(|| root.attribute("viewBox").and_then(parse_view_box))
        .ok_or(MeasureError::MissingSize)?;

    Ok(RenderedPage::new(markup, width, height))
}

fn parse_length(value: &str) -> Option<f32> {
    let value = value.trim();
    let (number, scale) = if let Some(points) = value.strip_suffix("pt") {
        (points, PX_PER_PT)
    } else if let Some(pixels) = value.strip_suffix("px") {
        (pixels, 1.0)
    } else {
        (value, 1.0)
    };

    let length = number.trim().parse::<f32>().ok()? * scale;
    (length.is_finite() && length > 0.0).then_some(length)
}

fn parse_view_box(value: &str) -> Option<(f32, f32)> {
    let numbers: Vec<f32> = value
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|part| !part.is_empty())
        .map(str::parse)
        .collect::<Result<_, _>>()
        .ok()?;

    match numbers.as_slice() {
        [_, _, width, height] if *width > 0.0 && *height > 0.0 => Some((*width, *height)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_pixel_size() {
        let svg = r#"<svg xmlns="http://www.w3.org/2000/svg" width="612px" height="792px"/>"#;
        let page = measure_svg(svg).expect("svg should measure");
        assert_eq!((page.width, page.height), (612.0, 792.0));
    }

    #[test]
    fn converts_points() {
        let page =
            measure_svg(r#"<svg width="72pt" height="144pt"></svg>"#).expect("svg should measure");
        assert_eq!((page.width, page.height), (96.0, 192.0));
    }

    #[test]
    fn falls_back_to_view_box() {
        let page =
            measure_svg(r#"<svg viewBox="0 0 300,400"><g/></svg>"#).expect("svg should measure");
        assert_eq!((page.width, page.height), (300.0, 400.0));
        assert!(page.markup.contains("<g/>"));
    }

    #[test]
    fn rejects_other_markup() {
        assert!(matches!(measure_svg("<div/>"), Err(MeasureError::NotSvg(name)) if name == "div"));
        assert!(matches!(measure_svg("<svg"), Err(MeasureError::Parse(_))));
        assert!(matches!(measure_svg("<svg width=\"10\"/>"), Err(MeasureError::MissingSize)));
    }
}
