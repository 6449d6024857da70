/// Axis configuration with tick generation and data→pixel mapping.
///
/// The range is always the one requested: ticks are placed inside it, the
/// limits are never widened to round numbers.
#[derive(Debug, Clone)]
pub struct Axis {
    pub min: f64,
    pub max: f64,
    pub log: bool,
    pub label: String,
    pub tick_positions: Vec<f64>,
    pub tick_labels: Vec<String>,
    pub minor_ticks: Vec<f64>,
    /// Text labels drawn at given positions instead of numeric tick labels.
    pub category_labels: Vec<(f64, String)>,
}

impl Axis {
    /// Linear axis on `[min, max]` with "nice number" ticks.
    pub fn linear(min: f64, max: f64, target_ticks: usize) -> Self {
        let (min, max) = if max > min { (min, max) } else { (min, min + 1.0) };
        let step = nice_step((max - min) / (target_ticks.max(2) - 1) as f64);
        let eps = step * 1e-6;

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let first = (min / step - 1e-6).ceil() as i64;
        let mut k = first;
        loop {
            let v = k as f64 * step;
            if v > max + eps {
                break;
            }
            ticks.push(v);
            labels.push(format_tick(v, step));
            k += 1;
        }

        // 5 subdivisions per major
        let minor_step = step / 5.0;
        let mut minor = Vec::new();
        let mut k = (min / minor_step - 1e-6).ceil() as i64;
        loop {
            let v = k as f64 * minor_step;
            if v > max + eps {
                break;
            }
            if k % 5 != 0 {
                minor.push(v);
            }
            k += 1;
        }

        Self {
            min,
            max,
            log: false,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
            category_labels: Vec::new(),
        }
    }

    /// Logarithmic axis on `[min, max]`; non-positive bounds are clamped.
    pub fn log(min: f64, max: f64) -> Self {
        let min = if min > 0.0 { min } else { 1e-3 };
        let max = if max > min { max } else { min * 10.0 };
        let lo = min.log10().floor() as i32;
        let hi = max.log10().ceil() as i32;

        let mut ticks = Vec::new();
        let mut labels = Vec::new();
        let mut minor = Vec::new();
        for exp in lo..=hi {
            let v = 10.0_f64.powi(exp);
            if v >= min * (1.0 - 1e-9) && v <= max * (1.0 + 1e-9) {
                ticks.push(v);
                labels.push(format_decade(exp));
            }
            for m in 2..=9 {
                let mv = m as f64 * v;
                if mv > min && mv < max {
                    minor.push(mv);
                }
            }
        }

        Self {
            min,
            max,
            log: true,
            label: String::new(),
            tick_positions: ticks,
            tick_labels: labels,
            minor_ticks: minor,
            category_labels: Vec::new(),
        }
    }

    /// One labelled tick per bin edge, labels rounded to integers.
    pub fn per_bin(edges: &[f64]) -> Self {
        let min = edges.first().copied().unwrap_or(0.0);
        let max = edges.last().copied().unwrap_or(1.0);
        Self {
            min,
            max,
            log: false,
            label: String::new(),
            tick_positions: edges.to_vec(),
            tick_labels: edges.iter().map(|e| format!("{}", e.round() as i64)).collect(),
            minor_ticks: Vec::new(),
            category_labels: Vec::new(),
        }
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    /// Replace numeric labels by one text label per bin, at bin centres.
    pub fn with_bin_labels(mut self, edges: &[f64], labels: &[String]) -> Self {
        self.tick_labels.clear();
        self.category_labels = edges
            .windows(2)
            .zip(labels)
            .map(|(w, l)| (0.5 * (w[0] + w[1]), l.clone()))
            .collect();
        self
    }

    /// Keep the ticks, drop every label.
    pub fn without_tick_labels(mut self) -> Self {
        self.tick_labels.clear();
        self.category_labels.clear();
        self
    }

    /// Map a data value to pixel coordinate.
    pub fn data_to_pixel(&self, value: f64, px_min: f64, px_max: f64) -> f64 {
        let frac = if self.log {
            let log_val = value.max(1e-300).ln();
            let log_min = self.min.ln();
            let log_max = self.max.ln();
            (log_val - log_min) / (log_max - log_min)
        } else {
            (value - self.min) / (self.max - self.min)
        };
        px_min + frac * (px_max - px_min)
    }
}

fn nice_step(rough: f64) -> f64 {
    if !(rough.is_finite() && rough > 0.0) {
        return 1.0;
    }
    let exp = rough.log10().floor();
    let frac = rough / 10.0_f64.powf(exp);
    let nice_frac = if frac <= 1.5 {
        1.0
    } else if frac <= 3.5 {
        2.0
    } else if frac <= 7.5 {
        5.0
    } else {
        10.0
    };
    nice_frac * 10.0_f64.powf(exp)
}

fn format_tick(value: f64, step: f64) -> String {
    let decimals = if step >= 1.0 { 0 } else { (-step.log10().floor()) as usize };
    if decimals == 0 {
        // Avoid "-0"
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{}", v.round() as i64)
    } else {
        let v = if value.abs() < step * 0.01 { 0.0 } else { value };
        format!("{:.prec$}", v, prec = decimals)
    }
}

/// `1`, `10` and `10^{n}` otherwise.
fn format_decade(exp: i32) -> String {
    match exp {
        0 => "1".into(),
        1 => "10".into(),
        _ => format!("10^{{{exp}}}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn linear_keeps_requested_range() {
        let ax = Axis::linear(-5.0, 10.0, 6);
        assert_eq!((ax.min, ax.max), (-5.0, 10.0));
        assert!(ax.tick_positions.iter().all(|&t| (-5.0..=10.0).contains(&t)));
        assert_eq!(ax.tick_labels.first().map(String::as_str), Some("-4"));
        assert!(ax.tick_labels.contains(&"0".to_string()));
    }

    #[test]
    fn ratio_range_ticks() {
        let ax = Axis::linear(0.0, 2.0, 5);
        assert_eq!(ax.tick_labels, ["0.0", "0.5", "1.0", "1.5", "2.0"]);
    }

    #[test]
    fn data_to_pixel_linear() {
        let ax = Axis::linear(0.0, 100.0, 5);
        let px = ax.data_to_pixel(50.0, 0.0, 500.0);
        assert!((px - 250.0).abs() < 1e-9);
        // y axes map upwards
        assert!((ax.data_to_pixel(100.0, 400.0, 0.0)).abs() < 1e-9);
    }

    #[test]
    fn log_axis() {
        let ax = Axis::log(0.02, 6000.0);
        assert!(ax.log);
        assert_eq!(ax.tick_labels, ["10^{-1}", "1", "10", "10^{2}", "10^{3}"]);
        let mid = ax.data_to_pixel((0.02_f64 * 6000.0).sqrt(), 0.0, 1.0);
        assert!((mid - 0.5).abs() < 1e-9);
        assert!(Axis::log(0.0, 10.0).min > 0.0);
    }

    #[test]
    fn per_bin_and_bin_labels() {
        let edges = [0.0, 1.0, 2.0, 3.0];
        let ax = Axis::per_bin(&edges);
        assert_eq!(ax.tick_labels, ["0", "1", "2", "3"]);
        let labels = vec!["SR".to_string(), "CR1".into(), "CR2".into()];
        let ax = ax.with_bin_labels(&edges, &labels);
        assert!(ax.tick_labels.is_empty());
        assert_eq!(ax.category_labels[1], (1.5, "CR1".to_string()));
    }

    #[test]
    fn nice_step_values() {
        assert!((nice_step(3.2) - 2.0).abs() < 1e-9);
        assert!((nice_step(0.7) - 0.5).abs() < 1e-9);
        assert!((nice_step(15.0) - 10.0).abs() < 1e-9);
        assert!((nice_step(4.5) - 5.0).abs() < 1e-9);
        assert!((nice_step(1.2) - 1.0).abs() < 1e-9);
        assert!((nice_step(0.0) - 1.0).abs() < 1e-9);
    }
}
