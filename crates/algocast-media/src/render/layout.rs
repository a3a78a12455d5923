//! Filter graphs drawing each scene template on a solid canvas.
//!
//! Text goes through `drawtext=textfile=...` so scene text never needs
//! filter-graph escaping; the caller writes [`SceneGraph::text_files`]
//! before running ffmpeg.

use std::collections::BTreeMap;
use std::ffi::OsString;
use std::path::{Path, PathBuf};

use algocast_models::{EncodingConfig, PointerName, Pointers, Scene};
use serde_json::Value;

use super::value_label;

/// Fade-in length for drawn text.
const FADE_SECS: f64 = 0.4;
/// Horizontal centering expression for drawtext.
const CENTER_X: &str = "(w-text_w)/2";

/// Drawing surface size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Canvas {
    pub width: u32,
    pub height: u32,
}

impl From<&EncodingConfig> for Canvas {
    fn from(enc: &EncodingConfig) -> Self {
        Self {
            width: enc.width,
            height: enc.height,
        }
    }
}

/// A filter chain plus the text files its `drawtext` filters read.
#[derive(Debug, Clone, Default)]
pub struct SceneGraph {
    /// Comma-joined filter chain; empty draws a bare canvas
    pub filter: String,
    pub text_files: Vec<(PathBuf, String)>,
}

impl SceneGraph {
    pub fn is_empty(&self) -> bool {
        self.filter.is_empty()
    }
}

/// Build the filter graph for `scene`.
///
/// Text files are named `{text_stem}.t{n}.txt`.
pub fn scene_graph(
    scene: &Scene,
    duration: f64,
    canvas: Canvas,
    text_stem: &Path,
    font: Option<&Path>,
) -> SceneGraph {
    let mut g = GraphBuilder::new(text_stem, font, duration);

    match scene {
        Scene::Title { title, subtitle } => title_card(&mut g, canvas, title, subtitle),
        Scene::ArrayState {
            values,
            pointers,
            highlight,
        } => array_tape(&mut g, canvas, values, pointers, highlight),
        Scene::MovePointer {
            values,
            which,
            from,
            to,
        } => move_pointer(&mut g, canvas, values, *which, *from, *to),
        Scene::Callout { text } => boxed_text(&mut g, canvas, text, "yellow"),
        Scene::Complexity { time, space } => complexity_card(&mut g, canvas, time, space),
        Scene::Result { text } => boxed_text(&mut g, canvas, text, "limegreen"),
    }

    g.finish()
}

fn title_card(g: &mut GraphBuilder<'_>, canvas: Canvas, title: &str, subtitle: &str) {
    let h = canvas.height;
    g.text(title, h / 12, "white", CENTER_X, &format!("(h-text_h)/2-{}", h / 14), 0.0);
    if !subtitle.is_empty() {
        g.text(subtitle, h / 24, "gray", CENTER_X, &format!("(h-text_h)/2+{}", h / 16), 0.3);
    }
}

fn boxed_text(g: &mut GraphBuilder<'_>, canvas: Canvas, text: &str, color: &str) {
    let (w, h) = (canvas.width as i64, canvas.height as i64);
    let (bw, bh) = (w * 9 / 16, h / 5);
    g.rect((w - bw) / 2, (h - bh) / 2, bw, bh, color, Some(4), 0.0);

    let size = canvas.height / 24;
    let max_chars = (bw as f64 / (size as f64 * 0.55)) as usize;
    g.text(&wrap_text(text, max_chars.max(8)), size, "white", CENTER_X, "(h-text_h)/2", 0.2);
}

fn complexity_card(g: &mut GraphBuilder<'_>, canvas: Canvas, time: &str, space: &str) {
    let h = canvas.height;
    g.text("Complexity", h / 14, "white", CENTER_X, &(h * 28 / 100).to_string(), 0.0);
    g.text(&format!("Time: {}", time), h / 20, "skyblue", CENTER_X, &(h * 46 / 100).to_string(), 0.3);
    g.text(&format!("Space: {}", space), h / 20, "lightgreen", CENTER_X, &(h * 58 / 100).to_string(), 0.5);
}

fn array_tape(
    g: &mut GraphBuilder<'_>,
    canvas: Canvas,
    values: &[Value],
    pointers: &Pointers,
    highlight: &[i64],
) {
    let Some(tape) = Tape::new(canvas, values.len()) else {
        return;
    };
    // Cells are drawn left to right over the first part of the scene
    let cells_window = (g.duration * 0.3).min(1.0);
    tape.draw_cells(g, values, highlight, cells_window);

    let mut stacked: BTreeMap<i64, i64> = BTreeMap::new();
    let appear = (g.duration * 0.5).min(1.5);
    for (name, idx) in pointers.iter() {
        if !tape.contains(idx) {
            continue;
        }
        let level = stacked.entry(idx).or_insert(0);
        let y = tape.y0 - 34.0 - 28.0 * *level as f64;
        *level += 1;
        let x = format!("{:.0}-text_w/2", tape.center_x(idx));
        g.text(pointer_label(name), canvas.height / 30, pointer_color(name), &x, &format!("{:.0}", y), appear);
    }
}

fn move_pointer(
    g: &mut GraphBuilder<'_>,
    canvas: Canvas,
    values: &[Value],
    which: PointerName,
    from: i64,
    to: i64,
) {
    let caption = format!("{}: {} -> {}", which, from, to);
    g.text(&caption, canvas.height / 24, "gray", CENTER_X, &(canvas.height * 80 / 100).to_string(), 0.2);

    let Some(tape) = Tape::new(canvas, values.len()) else {
        return;
    };
    tape.draw_cells(g, values, &[], 0.0);
    if !(tape.contains(from) && tape.contains(to)) {
        return;
    }

    let (a, b) = (tape.center_x(from), tape.center_x(to));
    let start = g.duration * 0.3;
    let slide = (g.duration * 0.45).max(0.25);
    let x = format!("{a:.1}+({b:.1}-{a:.1})*min(1,max(0,(t-{start:.3})/{slide:.3}))-text_w/2");
    g.text(pointer_label(which), canvas.height / 30, pointer_color(which), &x, &format!("{:.0}", tape.y0 - 34.0), 0.0);
}

/// Row of square cells centered on the canvas.
struct Tape {
    x0: f64,
    y0: f64,
    cell: f64,
    n: usize,
}

impl Tape {
    fn new(canvas: Canvas, n: usize) -> Option<Self> {
        if n == 0 {
            return None;
        }
        let (w, h) = (canvas.width as f64, canvas.height as f64);
        let cell = (w * 86.0 / 1280.0).min((w - 120.0) / n as f64).floor().max(4.0);
        Some(Self {
            x0: ((w - cell * n as f64) / 2.0).floor(),
            y0: ((h - cell) / 2.0).floor(),
            cell,
            n,
        })
    }

    fn contains(&self, idx: i64) -> bool {
        idx >= 0 && (idx as usize) < self.n
    }

    fn center_x(&self, idx: i64) -> f64 {
        self.x0 + self.cell * (idx as f64 + 0.5)
    }

    fn draw_cells(&self, g: &mut GraphBuilder<'_>, values: &[Value], highlight: &[i64], window: f64) {
        let value_size = ((self.cell * 0.4) as u32).max(12);
        let index_size = ((self.cell * 0.22) as u32).max(10);
        let cy = self.y0 + self.cell / 2.0;

        for (i, value) in values.iter().enumerate() {
            let appear = window * i as f64 / self.n as f64;
            let x = self.x0 + self.cell * i as f64;
            let cell = self.cell as i64;
            let cx = self.center_x(i as i64);

            if highlight.contains(&(i as i64)) {
                g.rect(x as i64, self.y0 as i64, cell, cell, "yellow@0.35", None, appear);
            }
            g.rect(x as i64, self.y0 as i64, cell, cell, "white", Some(2), appear);

            let label = value_label(value);
            if !label.is_empty() {
                g.text(
                    &label,
                    value_size,
                    "white",
                    &format!("{:.0}-text_w/2", cx),
                    &format!("{:.0}-text_h/2", cy),
                    appear,
                );
            }
            g.text(
                &i.to_string(),
                index_size,
                "gray",
                &format!("{:.0}-text_w/2", cx),
                &format!("{:.0}", self.y0 + self.cell + 8.0),
                appear,
            );
        }
    }
}

fn pointer_label(name: PointerName) -> &'static str {
    match name {
        PointerName::Left => "L",
        PointerName::Mid => "M",
        PointerName::Right => "R",
    }
}

fn pointer_color(name: PointerName) -> &'static str {
    match name {
        PointerName::Left => "dodgerblue",
        PointerName::Mid => "mediumpurple",
        PointerName::Right => "tomato",
    }
}

struct GraphBuilder<'a> {
    text_stem: &'a Path,
    font: Option<&'a Path>,
    duration: f64,
    filters: Vec<String>,
    text_files: Vec<(PathBuf, String)>,
}

impl<'a> GraphBuilder<'a> {
    fn new(text_stem: &'a Path, font: Option<&'a Path>, duration: f64) -> Self {
        Self {
            text_stem,
            font,
            duration,
            filters: Vec::new(),
            text_files: Vec::new(),
        }
    }

    fn clamp_appear(&self, appear: f64) -> f64 {
        appear.clamp(0.0, (self.duration - FADE_SECS).max(0.0))
    }

    fn text(&mut self, content: &str, size: u32, color: &str, x: &str, y: &str, appear: f64) {
        let mut name = OsString::from(self.text_stem.as_os_str());
        name.push(format!(".t{}.txt", self.text_files.len()));
        let path = PathBuf::from(name);

        let appear = self.clamp_appear(appear);
        let alpha = if appear <= 0.0 {
            format!("min(1,t/{})", FADE_SECS)
        } else {
            format!("if(lt(t,{a:.3}),0,min(1,(t-{a:.3})/{f}))", a = appear, f = FADE_SECS)
        };

        let mut filter = format!(
            "drawtext=expansion=none:textfile={}:fontsize={}:fontcolor={}:line_spacing=8:x={}:y={}:alpha={}",
            quote(&path.to_string_lossy()),
            size,
            color,
            quote(x),
            quote(y),
            quote(&alpha),
        );
        if let Some(font) = self.font {
            filter.push_str(&format!(":fontfile={}", quote(&font.to_string_lossy())));
        }

        self.filters.push(filter);
        self.text_files.push((path, content.to_string()));
    }

    #[allow(clippy::too_many_arguments)]
    fn rect(&mut self, x: i64, y: i64, w: i64, h: i64, color: &str, thickness: Option<u32>, appear: f64) {
        let t = thickness.map_or_else(|| "fill".to_string(), |t| t.to_string());
        let mut filter = format!("drawbox=x={}:y={}:w={}:h={}:color={}:t={}", x, y, w, h, color, t);
        let appear = self.clamp_appear(appear);
        if appear > 0.0 {
            filter.push_str(&format!(":enable={}", quote(&format!("gte(t,{:.3})", appear))));
        }
        self.filters.push(filter);
    }

    fn finish(self) -> SceneGraph {
        SceneGraph {
            filter: self.filters.join(","),
            text_files: self.text_files,
        }
    }
}

/// Single-quote a filter option value.
fn quote(value: &str) -> String {
    format!("'{}'", value.replace('\'', "'\\''"))
}

/// Greedy word wrap; words longer than a line stay whole.
fn wrap_text(text: &str, max_chars: usize) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut line = String::new();

    for word in text.split_whitespace() {
        if !line.is_empty() && line.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut line));
        }
        if !line.is_empty() {
            line.push(' ');
        }
        line.push_str(word);
    }
    if !line.is_empty() {
        lines.push(line);
    }
    lines.join("\n")
}
