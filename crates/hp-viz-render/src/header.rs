use hp_viz::layout::LabelBlock;

use crate::canvas::Canvas;
use crate::config::VizConfig;
use crate::layout::margins::Pad;
use crate::primitives::*;

const DEFAULT_EXPERIMENT: &str = "ATLAS";

/// Draw the experiment label block: **ATLAS** Internal, the
/// √s/luminosity line, then one line per caption.
///
/// The theme's experiment name replaces the one in the artifact; an empty
/// name drops the first line and keeps the rest in place.
pub fn draw_experiment_header(
    canvas: &mut Canvas,
    pad: &Pad,
    block: &LabelBlock,
    config: &VizConfig,
) {
    let x = pad.ndc_x(block.x);
    let scale = config.font.scale;
    let name = &config.experiment.name;

    if !name.is_empty() {
        let y = pad.ndc_y(block.line_y(0));
        let size = pad.text_px(block.experiment_size) * scale;
        let bold = TextStyle {
            size,
            color: config.colors.frame,
            weight: FontWeight::Bold,
            style: FontStyle::Italic,
            ..Default::default()
        };
        canvas.text(x, y, name, &bold);

        // the status offset fits the default name; wider names push it right
        if !block.status.is_empty() {
            let regular = TextStyle { size, color: config.colors.frame, ..Default::default() };
            let extra = canvas.measure_text(name, &bold).width
                - canvas.measure_text(DEFAULT_EXPERIMENT, &bold).width;
            let status_x = pad.ndc_x(block.x + block.status_dx) + extra.max(0.0);
            canvas.text(status_x, y, &block.status, &regular);
        }
    }

    let line = TextStyle {
        size: pad.text_px(block.text_size) * scale,
        color: config.colors.frame,
        ..Default::default()
    };
    canvas.text(x, pad.ndc_y(block.line_y(1)), &block.energy_lumi, &line);
    for (i, caption) in block.captions.iter().enumerate() {
        canvas.text(x, pad.ndc_y(block.line_y(i + 2)), caption, &line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hp_viz::PlotOptions;
    use hp_viz::layout::CanvasSpec;

    /// x attribute of the `<text>` element whose content is `content`.
    fn text_x(svg: &str, content: &str) -> f64 {
        let end = svg.find(&format!(">{content}</text>")).unwrap();
        let start = svg[..end].rfind("<text x=\"").unwrap() + 9;
        let len = svg[start..].find('"').unwrap();
        svg[start..start + len].parse().unwrap()
    }

    fn status_x(experiment: &str) -> (f64, f64) {
        let opts = PlotOptions::default();
        let spec = CanvasSpec::decide(&opts);
        let (w, h) = (spec.width as f64, spec.height as f64);
        let pad = Pad::from_spec(w, h, &spec.main);
        let block = LabelBlock::decide(&opts, "ATLAS");
        let mut config = VizConfig::default();
        config.experiment.name = experiment.into();

        let mut canvas = Canvas::new(w, h, "sans-serif");
        draw_experiment_header(&mut canvas, &pad, &block, &config);
        (text_x(&canvas.finish_svg(), "Internal"), pad.ndc_x(block.x + block.status_dx))
    }

    #[test]
    fn status_keeps_fixed_offset_after_short_name() {
        for name in ["ATLAS", "CMS"] {
            let (x, fixed) = status_x(name);
            assert!((x - fixed).abs() < 0.01, "{name}: {x} vs {fixed}");
        }
    }

    #[test]
    fn status_moves_past_long_name() {
        let (x, fixed) = status_x("A Very Long Collaboration Name");
        assert!(x > fixed + 50.0);
    }

    #[test]
    fn caption_lines_follow_energy_line() {
        let opts = PlotOptions { plot_labels: vec!["SR".into()], lumi: 139.0, ..Default::default() };
        let spec = CanvasSpec::decide(&opts);
        let (w, h) = (spec.width as f64, spec.height as f64);
        let pad = Pad::from_spec(w, h, &spec.main);
        let block = LabelBlock::decide(&opts, "ATLAS");
        let mut canvas = Canvas::new(w, h, "sans-serif");
        draw_experiment_header(&mut canvas, &pad, &block, &VizConfig::default());
        let svg = canvas.finish_svg();
        assert!(svg.contains("139.0 fb"));
        assert!(svg.contains(">SR</text>"));
    }
}
