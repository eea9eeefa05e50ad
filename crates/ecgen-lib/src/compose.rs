use crate::beat::{qrs_shape, sample_beat, BeatConfig};
use crate::rhythm::Rhythm;
use crate::signal::{Sample, Strip};
use crate::timebase::TimeBase;
use rand::{rngs::StdRng, Rng, SeedableRng};

/// Beats start near the left paper edge, not flush against it.
const LEFT_EDGE_X: f64 = 10.0;
/// Assumed atrial flutter rate, cycles per minute.
const FLUTTER_RATE_CPM: f64 = 300.0;
/// Peak-to-trough height of the flutter sawtooth, pixel units.
const FLUTTER_AMPLITUDE: f64 = 8.0;
/// Conducted beats per flutter cycle (4:1 block).
const FLUTTER_CONDUCTION_RATIO: usize = 4;
/// Per-sample step bound of the fibrillatory random walk.
const FIB_WALK_STEP: f64 = 1.2;
/// Absolute amplitude bound of the fibrillatory baseline.
const FIB_WALK_BOUND: f64 = 4.0;
/// Conducted-beat interval range for fibrillation, as fractions of the
/// strip width. Roughly 55-145 bpm at the default paper speed.
const FIB_GAP_RANGE: (f64, f64) = (0.07, 0.18);
/// Duration of the conducted QRS impulse overlaid on flutter/fibrillation
/// baselines (seconds).
const CONDUCTED_QRS_S: f64 = 0.08;

/// Tiling recipe for the regular composer families.
#[derive(Debug, Clone, Copy)]
struct TileSpec {
    rate_bpm: f64,
    /// Sampling density factor relative to the paper speed; < 1.0 draws
    /// visually compressed complexes (PSVT).
    density: f64,
    beat: BeatConfig,
    /// `(beat index, early offset px)` for the premature-beat family.
    early_beat: Option<(usize, f64)>,
}

/// Generate a full strip with ambient randomness. Regular families are
/// deterministic; fibrillation draws fresh intervals per call.
pub fn generate_strip(rhythm: Rhythm, timebase: &TimeBase) -> Strip {
    let mut rng = rand::thread_rng();
    generate_strip_with_rng(rhythm, timebase, &mut rng)
}

/// Generate a full strip reproducibly from a seed. Used by tests to assert
/// statistical properties of the irregular families.
pub fn generate_strip_seeded(rhythm: Rhythm, timebase: &TimeBase, seed: u64) -> Strip {
    let mut rng = StdRng::seed_from_u64(seed);
    generate_strip_with_rng(rhythm, timebase, &mut rng)
}

/// Single dispatch point from rhythm identifier to composer.
pub fn generate_strip_with_rng<R: Rng>(rhythm: Rhythm, timebase: &TimeBase, rng: &mut R) -> Strip {
    match rhythm {
        Rhythm::AtrialFlutter => flutter_strip(timebase),
        Rhythm::AtrialFibrillation => fibrillation_strip(timebase, rng),
        regular => tile_beats(timebase, &tile_spec(regular)),
    }
}

/// Static rhythm-to-parameter table for the tiled families. Flutter and
/// fibrillation are dispatched before this table is consulted; if they do
/// reach it they share the normal-sinus fallback row.
fn tile_spec(rhythm: Rhythm) -> TileSpec {
    let base = BeatConfig::default();
    let sinus = TileSpec {
        rate_bpm: 75.0,
        density: 1.0,
        beat: base,
        early_beat: None,
    };
    match rhythm {
        Rhythm::SinusBradycardia => TileSpec {
            rate_bpm: 45.0,
            ..sinus
        },
        Rhythm::SinusTachycardia => TileSpec {
            rate_bpm: 130.0,
            ..sinus
        },
        Rhythm::Pac => TileSpec {
            early_beat: Some((3, 40.0)),
            ..sinus
        },
        Rhythm::Psvt => TileSpec {
            rate_bpm: 180.0,
            density: 0.6,
            beat: BeatConfig {
                amplitude: 15.0,
                pr_s: 0.06,
                qrs_s: 0.06,
                ..base
            },
            early_beat: None,
        },
        Rhythm::Junctional => TileSpec {
            rate_bpm: 45.0,
            beat: BeatConfig {
                pr_s: 0.02,
                t_polarity: -1.0,
                ..base
            },
            ..sinus
        },
        Rhythm::FirstDegreeBlock => TileSpec {
            rate_bpm: 70.0,
            beat: BeatConfig { pr_s: 0.32, ..base },
            ..sinus
        },
        Rhythm::StemiInferior => TileSpec {
            rate_bpm: 80.0,
            beat: BeatConfig {
                st_offset: 6.0,
                ..base
            },
            ..sinus
        },
        Rhythm::Nstemi => TileSpec {
            rate_bpm: 95.0,
            beat: BeatConfig {
                st_offset: -3.5,
                t_polarity: -1.0,
                ..base
            },
            ..sinus
        },
        Rhythm::Sinus | Rhythm::AtrialFlutter | Rhythm::AtrialFibrillation => sinus,
    }
}

/// Repeat the beat sampler at a fixed interval until the next beat would no
/// longer fit inside `strip_width - trailing_margin`. The early-beat shift
/// is bounded so the premature beat can neither precede the previous beat's
/// end nor go negative.
fn tile_beats(timebase: &TimeBase, spec: &TileSpec) -> Strip {
    let interval_px = timebase.seconds_to_px(60.0 / spec.rate_bpm);
    let density = timebase.px_per_second * spec.density;
    let beat_px = (spec.beat.duration_s() * density).round();
    let limit = timebase.strip_width() - timebase.trailing_margin;

    let mut starts = Vec::new();
    let mut prev_end = 0.0;
    let mut k = 0usize;
    loop {
        let scheduled = LEFT_EDGE_X + k as f64 * interval_px;
        let start = match spec.early_beat {
            Some((idx, early_px)) if idx == k => (scheduled - early_px).max(prev_end).max(0.0),
            _ => scheduled,
        };
        if start + beat_px > limit {
            break;
        }
        starts.push(start);
        prev_end = start + beat_px;
        k += 1;
    }

    // At fast rates a beat outlasts the RR interval; clip its tail at the
    // next beat's onset so x stays non-decreasing.
    let mut samples = Vec::new();
    for (i, &start) in starts.iter().enumerate() {
        let cutoff = starts.get(i + 1).copied().unwrap_or(f64::INFINITY);
        samples.extend(
            sample_beat(start, density, &spec.beat)
                .into_iter()
                .filter(|s| s.x < cutoff),
        );
    }
    Strip { samples }
}

/// Triangular sawtooth baseline with a conducted QRS impulse summed in every
/// 4th flutter cycle. Baseline and impulse train are independent signals
/// added together, so samples outside the impulse windows remain exactly
/// periodic with the flutter period.
fn flutter_strip(timebase: &TimeBase) -> Strip {
    let period_px = timebase.seconds_to_px(60.0 / FLUTTER_RATE_CPM);
    let n = (timebase.strip_width() - timebase.trailing_margin).floor() as usize;
    let mut samples: Vec<Sample> = (0..n)
        .map(|i| {
            let x = i as f64;
            let phase = (x / period_px).fract();
            Sample::new(x, FLUTTER_AMPLITUDE * (phase - 0.5).abs() * 2.0 * 0.5)
        })
        .collect();

    let qrs_px = (CONDUCTED_QRS_S * timebase.px_per_second).round() as usize;
    let amplitude = BeatConfig::default().amplitude;
    let stride = period_px * FLUTTER_CONDUCTION_RATIO as f64;
    let mut start = 0.0;
    while start + qrs_px as f64 <= n as f64 {
        add_qrs_impulse(&mut samples, start as usize, qrs_px, amplitude);
        start += stride;
    }
    Strip { samples }
}

/// Irregularly-irregular ventricular response over a fibrillatory baseline:
/// a bounded uniform random walk with conducted QRS impulses at intervals
/// drawn fresh from a range scaled to the strip width.
fn fibrillation_strip<R: Rng>(timebase: &TimeBase, rng: &mut R) -> Strip {
    let n = (timebase.strip_width() - timebase.trailing_margin).floor() as usize;
    let mut samples = Vec::with_capacity(n);
    let mut y = 0.0;
    for i in 0..n {
        y += rng.gen_range(-FIB_WALK_STEP..FIB_WALK_STEP);
        y = y.clamp(-FIB_WALK_BOUND, FIB_WALK_BOUND);
        samples.push(Sample::new(i as f64, y));
    }

    let qrs_px = (CONDUCTED_QRS_S * timebase.px_per_second).round() as usize;
    let amplitude = BeatConfig::default().amplitude;
    let min_gap = FIB_GAP_RANGE.0 * timebase.strip_width();
    let max_gap = FIB_GAP_RANGE.1 * timebase.strip_width();
    let mut x = LEFT_EDGE_X + rng.gen_range(0.0..min_gap);
    while x + qrs_px as f64 <= n as f64 {
        add_qrs_impulse(&mut samples, x as usize, qrs_px, amplitude);
        x += rng.gen_range(min_gap..max_gap);
    }
    Strip { samples }
}

/// Sum a short QRS-shaped impulse onto already-generated samples. Summing
/// instead of overwriting keeps the underlying baseline intact outside the
/// spike and avoids index clamping at the strip boundary.
fn add_qrs_impulse(samples: &mut [Sample], start: usize, len_px: usize, amplitude: f64) {
    for i in 0..len_px {
        let idx = start + i;
        if idx >= samples.len() {
            break;
        }
        let f = i as f64 / len_px as f64;
        samples[idx].y += qrs_shape(f, amplitude);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn r_peak_positions(strip: &Strip, threshold: f64) -> Vec<f64> {
        let mut peaks = Vec::new();
        let mut in_peak = false;
        let mut best: Option<(f64, f64)> = None;
        for sample in &strip.samples {
            if sample.y >= threshold {
                in_peak = true;
                if best.map_or(true, |(_, y)| sample.y > y) {
                    best = Some((sample.x, sample.y));
                }
            } else if in_peak {
                peaks.push(best.take().map(|(x, _)| x).unwrap());
                in_peak = false;
            }
        }
        if let Some((x, _)) = best {
            if in_peak {
                peaks.push(x);
            }
        }
        peaks
    }

    #[test]
    fn sinus_at_75_yields_six_to_eight_beats() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::Sinus, &tb, 1);
        let peaks = r_peak_positions(&strip, 0.9 * 22.0);
        assert!(
            (6..=8).contains(&peaks.len()),
            "expected 6-8 beats, found {}",
            peaks.len()
        );
    }

    #[test]
    fn rate_orders_beat_counts() {
        let tb = TimeBase::default();
        let count = |rhythm| {
            let strip = generate_strip_seeded(rhythm, &tb, 1);
            r_peak_positions(&strip, 0.9 * 22.0).len()
        };
        let brady = count(Rhythm::SinusBradycardia);
        let sinus = count(Rhythm::Sinus);
        let tachy = count(Rhythm::SinusTachycardia);
        assert!(brady < sinus, "brady {} vs sinus {}", brady, sinus);
        assert!(sinus < tachy, "sinus {} vs tachy {}", sinus, tachy);
    }

    #[test]
    fn beat_count_tracks_rate_within_one() {
        let tb = TimeBase::default();
        for (rhythm, rate) in [
            (Rhythm::Sinus, 75.0),
            (Rhythm::SinusBradycardia, 45.0),
            (Rhythm::SinusTachycardia, 130.0),
        ] {
            let strip = generate_strip_seeded(rhythm, &tb, 1);
            let beats = r_peak_positions(&strip, 0.9 * 22.0).len() as i64;
            let expected = (tb.strip_seconds / (60.0 / rate)).floor() as i64;
            assert!(
                (beats - expected).abs() <= 1,
                "{}: {} beats, expected ~{}",
                rhythm,
                beats,
                expected
            );
        }
    }

    #[test]
    fn every_rhythm_is_monotone_and_fits_the_strip() {
        let tb = TimeBase::default();
        for rhythm in Rhythm::ALL {
            let strip = generate_strip_seeded(rhythm, &tb, 7);
            assert!(!strip.is_empty(), "{} produced no samples", rhythm);
            for pair in strip.samples.windows(2) {
                assert!(
                    pair[1].x >= pair[0].x,
                    "{} has decreasing x at {}",
                    rhythm,
                    pair[1].x
                );
            }
            let last = strip.samples.last().unwrap().x;
            assert!(
                last <= tb.strip_width(),
                "{} overruns the strip: {}",
                rhythm,
                last
            );
        }
    }

    #[test]
    fn pac_breaks_the_regular_interval() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::Pac, &tb, 1);
        let peaks = r_peak_positions(&strip, 0.9 * 22.0);
        let diffs: Vec<f64> = peaks.windows(2).map(|w| w[1] - w[0]).collect();
        let regular = tb.seconds_to_px(60.0 / 75.0);
        assert!(diffs.iter().any(|d| *d < regular - 1.0), "no early beat");
        assert!(diffs.iter().any(|d| *d > regular + 1.0), "no long gap after the early beat");
    }

    #[test]
    fn first_degree_block_prolongs_every_pr_segment() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::FirstDegreeBlock, &tb, 1);
        let peaks = r_peak_positions(&strip, 0.9 * 22.0);
        assert!(!peaks.is_empty());
        let qrs_half_px = (0.5 * 0.08 * tb.px_per_second) as usize;
        let min_pr_px = 0.20 * tb.px_per_second;
        for peak_x in peaks {
            let peak_idx = strip
                .samples
                .iter()
                .position(|s| s.x == peak_x)
                .expect("peak sample");
            // Walk back from QRS onset over the isoelectric PR segment.
            let onset = peak_idx - qrs_half_px;
            let mut flat = 0usize;
            let mut i = onset;
            while i > 0 && strip.samples[i - 1].y == 0.0 {
                flat += 1;
                i -= 1;
            }
            assert!(
                flat as f64 >= min_pr_px,
                "PR segment only {} px at peak {}",
                flat,
                peak_x
            );
        }
    }

    #[test]
    fn stemi_elevates_every_st_segment() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::StemiInferior, &tb, 1);
        let peaks = r_peak_positions(&strip, 0.9 * 22.0);
        assert!(!peaks.is_empty());
        let qrs_half_px = (0.5 * 0.08 * tb.px_per_second) as usize;
        let st_px = (0.08 * tb.px_per_second) as usize;
        for peak_x in peaks {
            let peak_idx = strip
                .samples
                .iter()
                .position(|s| s.x == peak_x)
                .expect("peak sample");
            let st_start = peak_idx + qrs_half_px;
            for sample in &strip.samples[st_start..st_start + st_px] {
                assert_eq!(sample.y, 6.0, "ST not elevated at x={}", sample.x);
            }
        }
    }

    #[test]
    fn nstemi_depresses_st_and_inverts_t() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::Nstemi, &tb, 1);
        let peaks = r_peak_positions(&strip, 0.9 * 22.0);
        assert!(!peaks.is_empty());
        let qrs_half_px = (0.5 * 0.08 * tb.px_per_second) as usize;
        let st_px = (0.08 * tb.px_per_second) as usize;
        let t_px = (0.16 * tb.px_per_second) as usize;
        for peak_x in &peaks {
            let peak_idx = strip.samples.iter().position(|s| s.x == *peak_x).unwrap();
            let st_start = peak_idx + qrs_half_px;
            for sample in &strip.samples[st_start..st_start + st_px] {
                assert_eq!(sample.y, -3.5);
            }
            let t_start = st_start + st_px;
            assert!(strip.samples[t_start..t_start + t_px]
                .iter()
                .all(|s| s.y <= 0.0));
        }
    }

    #[test]
    fn junctional_inverts_the_t_wave() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::Junctional, &tb, 1);
        // Inverted T lobe dips below the terminal S deflection.
        let min = strip.samples.iter().map(|s| s.y).fold(f64::MAX, f64::min);
        assert!(min < -7.0, "no inverted T lobe, min y {}", min);
    }

    #[test]
    fn psvt_packs_more_and_smaller_complexes() {
        let tb = TimeBase::default();
        let psvt = generate_strip_seeded(Rhythm::Psvt, &tb, 1);
        let sinus_count = r_peak_positions(&generate_strip_seeded(Rhythm::Sinus, &tb, 1), 19.0).len();
        // Coarse sampling keeps the PSVT spike well under its nominal 15.
        let psvt_count = r_peak_positions(&psvt, 8.0).len();
        assert!(psvt_count > sinus_count);
        let peak = psvt.samples.iter().map(|s| s.y).fold(f64::MIN, f64::max);
        assert!(peak < 22.0 * 0.9, "PSVT complexes should be reduced, peak {}", peak);
    }

    #[test]
    fn flutter_baseline_is_periodic_outside_conducted_beats() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::AtrialFlutter, &tb, 1);
        let period_px = tb.seconds_to_px(60.0 / 300.0);
        let stride_px = period_px * 4.0;
        let qrs_px = (0.08 * tb.px_per_second).round();
        let clear = |x: f64| {
            let offset = x % stride_px;
            offset >= qrs_px && x + period_px < strip.samples.len() as f64
        };
        let mut compared = 0;
        for (i, sample) in strip.samples.iter().enumerate() {
            if !clear(sample.x) {
                continue;
            }
            let j = i + period_px as usize;
            if !clear(strip.samples[j].x) {
                continue;
            }
            assert!(
                (sample.y - strip.samples[j].y).abs() < 1e-9,
                "baseline not periodic at x={}",
                sample.x
            );
            compared += 1;
        }
        assert!(compared > 100);
    }

    #[test]
    fn fibrillation_intervals_are_irregular() {
        let tb = TimeBase::default();
        let strip = generate_strip_seeded(Rhythm::AtrialFibrillation, &tb, 42);
        let peaks = r_peak_positions(&strip, 10.0);
        assert!(peaks.len() >= 4, "expected several conducted beats, got {}", peaks.len());
        let diffs: Vec<f64> = peaks.windows(2).map(|w| w[1] - w[0]).collect();
        assert!(
            diffs.iter().any(|d| (d - diffs[0]).abs() > 1.0),
            "intervals unexpectedly constant: {:?}",
            diffs
        );
    }

    #[test]
    fn fibrillation_baseline_stays_bounded() {
        let tb = TimeBase::default();
        // Conducted impulses swing at most one full amplitude above the walk
        // and 0.3 of it below.
        let ceiling = FIB_WALK_BOUND + 22.0;
        let floor = -FIB_WALK_BOUND - 0.3 * 22.0;
        for seed in 0..5 {
            let strip = generate_strip_seeded(Rhythm::AtrialFibrillation, &tb, seed);
            assert!(strip
                .samples
                .iter()
                .all(|s| s.y >= floor - 1e-9 && s.y <= ceiling + 1e-9));
        }
    }

    #[test]
    fn seeded_generation_is_reproducible() {
        let tb = TimeBase::default();
        let a = generate_strip_seeded(Rhythm::AtrialFibrillation, &tb, 9);
        let b = generate_strip_seeded(Rhythm::AtrialFibrillation, &tb, 9);
        assert_eq!(a.samples, b.samples);
    }
}
