//! Text-grid builders for the signal graph.
//!
//! Both return `height` rows of exactly `width` characters.

/// Intensity ramp, faint to solid.
const RAMP: [char; 5] = [' ', '░', '▒', '▓', '█'];

/// A sine wave with a soft halo above and below the crest row.
///
/// `frequency` is radians per column; `phase_speed` shifts the wave per
/// frame.
pub fn sine_wave(
    width: usize,
    height: usize,
    frame: usize,
    frequency: f64,
    phase_speed: f64,
) -> Vec<String> {
    if height == 0 {
        return Vec::new();
    }
    let mut grid = vec![vec![RAMP[0]; width]; height];
    let top = height - 1;
    for x in 0..width {
        let y = ((x as f64) * frequency + (frame as f64) * phase_speed * 0.1).sin();
        let row = (((y + 1.0) / 2.0) * top as f64) as usize;
        let row = row.min(top);
        grid[top - row][x] = RAMP[4];
        for offset in 1..3usize {
            let fade = RAMP[4usize.saturating_sub(offset * 2)];
            if row + offset <= top {
                grid[top - (row + offset)][x] = fade;
            }
            if let Some(below) = row.checked_sub(offset) {
                grid[top - below][x] = fade;
            }
        }
    }
    grid.into_iter().map(String::from_iter).collect()
}

/// A vertical sweep line moving right at `speed` columns per frame, with a
/// fading wake and a dotted baseline.
pub fn scan_line(width: usize, height: usize, frame: usize, speed: f64) -> Vec<String> {
    if height == 0 {
        return Vec::new();
    }
    let mut grid = vec![vec![RAMP[0]; width]; height];
    if let Some(last) = grid.last_mut() {
        for (x, cell) in last.iter_mut().enumerate() {
            if x % 2 == 0 {
                *cell = '·';
            }
        }
    }
    if width > 0 {
        let head = ((frame as f64) * speed.max(0.0)) as usize % width;
        for (trail, &ch) in [RAMP[4], RAMP[3], RAMP[2], RAMP[1]].iter().enumerate() {
            let x = (head + width - trail % width) % width;
            for row in grid.iter_mut() {
                row[x] = ch;
            }
            if trail + 1 >= width {
                break;
            }
        }
    }
    grid.into_iter().map(String::from_iter).collect()
}
