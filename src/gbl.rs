//! Text dump of fitted stereo tracks for the external alignment fit.
//!
//! The format is line oriented and parsed positionally downstream, so the
//! keywords, field order and decimal precision below are fixed:
//!
//! ```text
//! New Event <event> 0.000000
//! New Track <index>
//! Track perPar (x0 y0 dxdz dydz) <4 x %.12f>
//! Track clPar (xT yT dxTdz dyTdz) <4 x %.12f>
//! Track clPrj <9 x "%.8f ">
//! New Strip id layer <index> <millepede id> <sensor name>
//! Strip ...
//! ```
//!
//! Each `New Strip` line is followed by the strip geometry, the track
//! crossing, the measurement residual and the expected scattering angle.
//! Strips are written per stereo pair in increasing z and numbered across
//! the whole track. All vectors are in the global frame.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};

use anyhow::Context;
use tracing::{debug, info};

use crate::curvilinear::{curvilinear_projection_matrix, project_parameters};
use crate::intercept::{path_length, track_sensor_intercept, u_residual};
use crate::scattering::{scattering_angle, BEAM_ENERGY_GEV, SENSOR_THICKNESS_X0};
use crate::strip::StripCluster;
use crate::track::{StereoTrack, Track, View};
use crate::Vector3;

/// Physics constants used for the per-strip scattering estimate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GblConfig {
    /// Track momentum in GeV. Default [`BEAM_ENERGY_GEV`].
    pub beam_energy_gev: f64,
    /// Sensor thickness in radiation lengths. Default [`SENSOR_THICKNESS_X0`].
    pub sensor_thickness_x0: f64,
}

impl Default for GblConfig {
    fn default() -> Self {
        Self {
            beam_energy_gev: BEAM_ENERGY_GEV,
            sensor_thickness_x0: SENSOR_THICKNESS_X0,
        }
    }
}

/// Writes events of fitted stereo tracks to `W`.
pub struct GblWriter<W: Write> {
    out: W,
    config: GblConfig,
    events: usize,
    tracks: usize,
}

impl GblWriter<BufWriter<File>> {
    /// Create (or truncate) the dump file at `path`.
    pub fn create(path: &str, config: GblConfig) -> anyhow::Result<Self> {
        let file = File::create(path).with_context(|| format!("creating GBL file {path}"))?;
        info!("Created GBL file writer for \"{}\"", path);
        Ok(Self::new(BufWriter::new(file), config))
    }
}

impl<W: Write> GblWriter<W> {
    pub fn new(out: W, config: GblConfig) -> Self {
        Self {
            out,
            config,
            events: 0,
            tracks: 0,
        }
    }

    /// Write one event and all of its tracks.
    ///
    /// The event is formatted completely before anything is written, so a
    /// track that cannot be dumped (unfitted, degenerate direction) leaves
    /// the output untouched.
    pub fn write_event(&mut self, event_number: i32, tracks: &[StereoTrack]) -> anyhow::Result<()> {
        let mut text = String::new();
        writeln!(text, "New Event {} {:.6}", event_number, 0.0)?;
        for (i, track) in tracks.iter().enumerate() {
            format_track(&mut text, i, track, &self.config)
                .with_context(|| format!("event {event_number}: formatting track {i}"))?;
        }

        self.out
            .write_all(text.as_bytes())
            .with_context(|| format!("event {event_number}: writing GBL output"))?;
        self.events += 1;
        self.tracks += tracks.len();
        debug!("Wrote event {} with {} tracks", event_number, tracks.len());
        Ok(())
    }

    /// Flush and return the underlying writer.
    pub fn finish(mut self) -> anyhow::Result<W> {
        self.out.flush().context("flushing GBL output")?;
        info!("Wrote {} events with {} tracks", self.events, self.tracks);
        Ok(self.out)
    }
}

fn push_vector(text: &mut String, label: &str, v: &Vector3) -> std::fmt::Result {
    writeln!(text, "{} {:.12} {:.12} {:.12}", label, v.x, v.y, v.z)
}

fn format_track(
    text: &mut String,
    index: usize,
    track: &StereoTrack,
    config: &GblConfig,
) -> anyhow::Result<()> {
    let x0 = track.intercept(View::Xz)?;
    let y0 = track.intercept(View::Yz)?;
    let dxdz = track.slope(View::Xz)?;
    let dydz = track.slope(View::Yz)?;
    let cl = project_parameters(x0, y0, dxdz, dydz)?;
    let prj = curvilinear_projection_matrix(&track.direction()?)?;

    writeln!(text, "New Track {index}")?;
    writeln!(
        text,
        "Track perPar (x0 y0 dxdz dydz) {:.12} {:.12} {:.12} {:.12}",
        x0, y0, dxdz, dydz
    )?;
    writeln!(
        text,
        "Track clPar (xT yT dxTdz dyTdz) {:.12} {:.12} {:.12} {:.12}",
        cl.x_t, cl.y_t, cl.x_t_prime, cl.y_t_prime
    )?;
    text.push_str("Track clPrj ");
    for i in 0..3 {
        for j in 0..3 {
            write!(text, "{:.8} ", prj[(i, j)])?;
        }
    }
    text.push('\n');

    let mut strip_index = 0;
    for pair in track.pairs() {
        for strip in pair.strips_by_z() {
            format_strip(text, strip_index, strip, &pair.position(), track, config)?;
            strip_index += 1;
        }
    }
    Ok(())
}

fn format_strip(
    text: &mut String,
    index: usize,
    strip: &StripCluster,
    hit: &Vector3,
    track: &StereoTrack,
    config: &GblConfig,
) -> anyhow::Result<()> {
    let trkpos = track_sensor_intercept(strip, track)?;
    let path = path_length(trkpos.z, track)?;
    let ures = u_residual(strip, track)?;
    let angle = scattering_angle(track, config.beam_energy_gev, config.sensor_thickness_x0)?;

    writeln!(
        text,
        "New Strip id layer {} {} {}",
        index,
        strip.sensor.millepede_id,
        strip.sensor_name()
    )?;
    push_vector(text, "Strip origin", &strip.origin())?;
    push_vector(text, "Strip 3D hit pos", hit)?;
    push_vector(text, "Strip track pos", &trkpos)?;
    writeln!(text, "Strip pathLen {:.12}", path)?;
    push_vector(text, "Strip meas dir", &strip.measured_dir)?;
    push_vector(text, "Strip non-meas dir", &strip.unmeasured_dir)?;
    push_vector(text, "Strip normal dir", &strip.normal())?;
    writeln!(text, "Strip u {:.12}", strip.local_u())?;
    writeln!(text, "Strip ures {:.12} {:.12}", ures, strip.u_error)?;
    writeln!(text, "Strip scatangle {:.12}", angle)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fit::RegressionFitter;
    use crate::test_utils::{Telescope, STRIP_ERROR};
    use crate::track::fit_stereo_track;

    fn fitted_track(dir: Vector3) -> StereoTrack {
        let tel = Telescope::default_top();
        let pairs = tel.pairs_along(&Vector3::new(0.2, -0.1, 0.0), &dir, Vector3::zeros());
        fit_stereo_track(&RegressionFitter, &StereoTrack::new(pairs)).unwrap()
    }

    fn dump(event: i32, tracks: &[StereoTrack]) -> String {
        let mut writer = GblWriter::new(Vec::new(), GblConfig::default());
        writer.write_event(event, tracks).unwrap();
        String::from_utf8(writer.finish().unwrap()).unwrap()
    }

    #[test]
    fn test_event_and_track_headers() {
        let track = fitted_track(Vector3::new(0.01, 0.02, 1.0));
        let text = dump(42, &[track.clone(), track]);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines[0], "New Event 42 0.000000");
        assert_eq!(lines[1], "New Track 0");
        assert!(lines[2].starts_with("Track perPar (x0 y0 dxdz dydz) "));
        assert!(lines[3].starts_with("Track clPar (xT yT dxTdz dyTdz) "));
        assert!(lines[4].starts_with("Track clPrj "));
        assert_eq!(text.matches("New Track ").count(), 2);
        assert!(text.contains("\nNew Track 1\n"));
    }

    #[test]
    fn test_track_line_precision() {
        let track = fitted_track(Vector3::new(0.01, 0.02, 1.0));
        let text = dump(1, std::slice::from_ref(&track));
        let lines: Vec<&str> = text.lines().collect();

        let per: Vec<&str> = lines[2].split(' ').skip(6).collect();
        assert_eq!(per.len(), 4);
        for field in &per {
            assert_eq!(field.split('.').nth(1).unwrap().len(), 12, "{field}");
        }
        let x0: f64 = per[0].parse().unwrap();
        assert!((x0 - track.intercept(View::Xz).unwrap()).abs() < 1e-12);
        let dydz: f64 = per[3].parse().unwrap();
        assert!((dydz - track.slope(View::Yz).unwrap()).abs() < 1e-12);

        // Nine 8-digit entries, each followed by a space
        let prj = lines[4].strip_prefix("Track clPrj ").unwrap();
        assert!(prj.ends_with(' '));
        let entries: Vec<&str> = prj.split_terminator(' ').collect();
        assert_eq!(entries.len(), 9);
        for e in &entries {
            assert_eq!(e.split('.').nth(1).unwrap().len(), 8, "{e}");
        }
        let m = curvilinear_projection_matrix(&track.direction().unwrap()).unwrap();
        let m01: f64 = entries[1].parse().unwrap();
        assert!((m01 - m[(0, 1)]).abs() < 1e-8);
    }

    #[test]
    fn test_strips_in_z_order_with_running_index() {
        let track = fitted_track(Vector3::new(0.01, 0.02, 1.0));
        let text = dump(7, std::slice::from_ref(&track));

        let strips: Vec<Vec<&str>> = text
            .lines()
            .filter(|l| l.starts_with("New Strip id layer "))
            .map(|l| l.split(' ').skip(4).collect())
            .collect();
        assert_eq!(strips.len(), 2 * track.pairs().len());

        for (i, fields) in strips.iter().enumerate() {
            assert_eq!(fields[0], i.to_string());
            // Axial sensor sits in front of its stereo partner
            let suffix = if i % 2 == 0 { "_axial" } else { "_stereo" };
            assert!(fields[2].ends_with(suffix), "{:?}", fields);
        }
        assert_eq!(strips[0][1], "11111");
        assert_eq!(strips[1][1], "11112");
        assert_eq!(strips[0][2], "L1t_axial");
    }

    #[test]
    fn test_strip_detail_lines() {
        let track = fitted_track(Vector3::new(0.0, 0.01, 1.0));
        let text = dump(3, std::slice::from_ref(&track));
        let lines: Vec<&str> = text.lines().collect();

        let start = lines
            .iter()
            .position(|l| l.starts_with("New Strip id layer 0 "))
            .unwrap();
        let keys = [
            "Strip origin ",
            "Strip 3D hit pos ",
            "Strip track pos ",
            "Strip pathLen ",
            "Strip meas dir ",
            "Strip non-meas dir ",
            "Strip normal dir ",
            "Strip u ",
            "Strip ures ",
            "Strip scatangle ",
        ];
        for (k, key) in keys.iter().enumerate() {
            assert!(lines[start + 1 + k].starts_with(key), "{}", lines[start + 1 + k]);
        }

        assert_eq!(lines[start + 1], "Strip origin 0.000000000000 0.000000000000 100.000000000000");
        let ures: Vec<f64> = lines[start + 9]
            .split(' ')
            .skip(2)
            .map(|v| v.parse().unwrap())
            .collect();
        assert_eq!(ures[1], STRIP_ERROR);
        let angle: f64 = lines[start + 10].split(' ').nth(2).unwrap().parse().unwrap();
        assert!(angle > 0.0 && angle < 1e-3, "{angle}");
    }

    #[test]
    fn test_unfitted_track_writes_nothing() {
        let tel = Telescope::default_top();
        let pairs = tel.pairs_along(&Vector3::zeros(), &Vector3::new(0.01, 0.02, 1.0), Vector3::zeros());
        let good = fitted_track(Vector3::new(0.01, 0.02, 1.0));

        let mut writer = GblWriter::new(Vec::new(), GblConfig::default());
        let err = writer
            .write_event(5, &[good, StereoTrack::new(pairs)])
            .unwrap_err();
        assert!(format!("{err:#}").contains("track 1"), "{err:#}");
        assert!(writer.finish().unwrap().is_empty());
    }
}
