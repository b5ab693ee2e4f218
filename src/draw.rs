use crate::config::WorldConfig;
use crate::snapshot::{AgentView, Snapshot};
use crate::sprite::{AGENT_HEIGHT, AGENT_WIDTH, CAP_HEIGHT, Silhouettes, cap_overhang};

pub const SKY: (u8, u8, u8) = (78, 192, 202);
pub const BARRIER: (u8, u8, u8) = (84, 168, 48);
pub const BARRIER_LIP: (u8, u8, u8) = (60, 130, 34);
pub const GROUND: (u8, u8, u8) = (222, 216, 149);
pub const GROUND_STRIPE: (u8, u8, u8) = (200, 190, 120);
pub const AGENT: (u8, u8, u8) = (250, 200, 40);
const LIP_HEIGHT: i32 = CAP_HEIGHT as i32;
const STRIPE: i32 = 24;

/// RGBA8 frame of `width` x `height` pixels.
pub struct Canvas<'a> {
    frame: &'a mut [u8],
    width: u32,
    height: u32,
}

impl<'a> Canvas<'a> {
    pub fn new(frame: &'a mut [u8], width: u32, height: u32) -> Self {
        debug_assert_eq!(frame.len(), (width * height * 4) as usize);
        Self { frame, width, height }
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = ((y * self.width + x) * 4) as usize;
        self.frame.get(idx..idx + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    pub fn clear(&mut self, (r, g, b): (u8, u8, u8)) {
        for px in self.frame.chunks_exact_mut(4) {
            px[0] = r; px[1] = g; px[2] = b; px[3] = 255;
        }
    }

    pub fn blend_pixel(&mut self, x: i32, y: i32, (r, g, b): (u8, u8, u8), a: u8) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height { return; }
        let idx = ((y as u32 * self.width + x as u32) * 4) as usize;
        if idx + 3 >= self.frame.len() { return; }
        let ar = a as u16; let iar = (255 - a) as u16;
        let dr = self.frame[idx] as u16; let dg = self.frame[idx + 1] as u16; let db = self.frame[idx + 2] as u16;
        self.frame[idx]     = (((r as u16) * ar + dr * iar) / 255) as u8;
        self.frame[idx + 1] = (((g as u16) * ar + dg * iar) / 255) as u8;
        self.frame[idx + 2] = (((b as u16) * ar + db * iar) / 255) as u8;
        self.frame[idx + 3] = 255;
    }

    /// Clipped to the canvas; negative origins are fine.
    pub fn fill_rect(&mut self, x: i32, y: i32, w: i32, h: i32, col: (u8, u8, u8), a: u8) {
        let x0 = x.max(0); let y0 = y.max(0);
        let x1 = (x + w).min(self.width as i32); let y1 = (y + h).min(self.height as i32);
        for py in y0..y1 { for px in x0..x1 { self.blend_pixel(px, py, col, a); } }
    }

    pub fn draw_text(&mut self, text: &str, x: i32, y: i32, scale: i32, col: (u8, u8, u8)) {
        let mut cx = x;
        for ch in text.chars() { cx += self.draw_char(ch, cx, y, scale, col); }
    }

    fn draw_char(&mut self, ch: char, x: i32, y: i32, scale: i32, col: (u8, u8, u8)) -> i32 {
        if let Some(rows) = glyph_5x7(ch) {
            for (ry, row) in rows.iter().enumerate() {
                for rx in 0..5 {
                    if (row >> (4 - rx)) & 1 == 1 {
                        self.fill_rect(x + rx * scale, y + ry as i32 * scale, scale, scale, col, 255);
                    }
                }
            }
        }
        5 * scale + scale
    }

    pub fn text_width(text: &str, scale: i32) -> i32 {
        text.chars().count() as i32 * 6 * scale
    }
}

/// Paints one tick: sky, barriers, scrolling ground, agents and the HUD.
pub fn render(canvas: &mut Canvas<'_>, snapshot: &Snapshot, cfg: &WorldConfig, sprites: &Silhouettes) {
    canvas.clear(SKY);

    let w = cfg.obstacle_width;
    let inset = cap_overhang(w as u32) as i32;
    for o in &snapshot.obstacles {
        // top barrier runs from the ceiling down to the gap
        canvas.fill_rect(o.x + inset, 0, w - 2 * inset, o.gap_start - LIP_HEIGHT, BARRIER, 255);
        canvas.fill_rect(o.x, o.gap_start - LIP_HEIGHT, w, LIP_HEIGHT, BARRIER_LIP, 255);
        canvas.fill_rect(o.x, o.gap_end, w, LIP_HEIGHT, BARRIER_LIP, 255);
        canvas.fill_rect(o.x + inset, o.gap_end + LIP_HEIGHT, w - 2 * inset, cfg.floor_y - o.gap_end - LIP_HEIGHT, BARRIER, 255);
    }

    let ground_h = cfg.height as i32 - cfg.floor_y;
    canvas.fill_rect(0, cfg.floor_y, cfg.width as i32, ground_h, GROUND, 255);
    let shift = ((snapshot.tick as i64 * cfg.scroll_velocity as i64) % (STRIPE as i64 * 2)) as i32;
    let mut sx = -shift;
    while sx < cfg.width as i32 {
        canvas.fill_rect(sx, cfg.floor_y, STRIPE, 12, GROUND_STRIPE, 255);
        sx += STRIPE * 2;
    }

    for agent in &snapshot.agents {
        draw_agent(canvas, agent, sprites);
    }

    let score = format!("SCORE: {}", snapshot.score);
    let sw = Canvas::text_width(&score, 3);
    canvas.draw_text(&score, cfg.width as i32 - 15 - sw, 15, 3, (255, 255, 255));
    canvas.draw_text(&format!("GENS: {}", snapshot.generation), 15, 15, 3, (255, 255, 255));
    canvas.draw_text(&format!("ALIVE: {}", snapshot.alive), 15, 15 + 21 + 10, 3, (255, 255, 255));
}

// Nearest-neighbour rotation of the silhouette about its centre.
fn draw_agent(canvas: &mut Canvas<'_>, agent: &AgentView, sprites: &Silhouettes) {
    let mask = sprites.agent(agent.frame);
    let (sin, cos) = agent.tilt.to_radians().sin_cos();
    let cx = AGENT_WIDTH as f32 / 2.0;
    let cy = AGENT_HEIGHT as f32 / 2.0;
    let reach = cx.hypot(cy).ceil() as i32;
    let ox = agent.x as f32 + cx;
    // same row collision uses
    let oy = agent.y.round_ties_even() + cy;
    for dy in -reach..=reach {
        for dx in -reach..=reach {
            let (fx, fy) = (dx as f32 + 0.5, dy as f32 + 0.5);
            // screen y grows downward, so a positive tilt turns the nose up
            let sx = fx * cos - fy * sin + cx;
            let sy = fx * sin + fy * cos + cy;
            if sx < 0.0 || sy < 0.0 {
                continue;
            }
            if mask.get(sx as u32, sy as u32) {
                canvas.blend_pixel(ox as i32 + dx, oy as i32 + dy, AGENT, 220);
            }
        }
    }
}

fn glyph_5x7(ch: char) -> Option<[u8; 7]> {
    let c = ch.to_ascii_uppercase();
    Some(match c {
        'A'=>[0b01110,0b10001,0b10001,0b11111,0b10001,0b10001,0b10001],
        'C'=>[0b01110,0b10001,0b10000,0b10000,0b10000,0b10001,0b01110],
        'E'=>[0b11111,0b10000,0b11110,0b10000,0b10000,0b10000,0b11111],
        'G'=>[0b01110,0b10001,0b10000,0b10111,0b10001,0b10001,0b01110],
        'I'=>[0b11111,0b00100,0b00100,0b00100,0b00100,0b00100,0b11111],
        'L'=>[0b10000,0b10000,0b10000,0b10000,0b10000,0b10000,0b11111],
        'N'=>[0b10001,0b11001,0b10101,0b10011,0b10001,0b10001,0b10001],
        'O'=>[0b01110,0b10001,0b10001,0b10001,0b10001,0b10001,0b01110],
        'R'=>[0b11110,0b10001,0b10001,0b11110,0b10100,0b10010,0b10001],
        'S'=>[0b01111,0b10000,0b10000,0b01110,0b00001,0b00001,0b11110],
        'V'=>[0b10001,0b10001,0b10001,0b10001,0b10001,0b01010,0b00100],
        '0'=>[0b01110,0b10001,0b10011,0b10101,0b11001,0b10001,0b01110],
        '1'=>[0b00100,0b01100,0b00100,0b00100,0b00100,0b00100,0b01110],
        '2'=>[0b01110,0b10001,0b00001,0b00010,0b00100,0b01000,0b11111],
        '3'=>[0b11110,0b00001,0b00001,0b01110,0b00001,0b00001,0b11110],
        '4'=>[0b00010,0b00110,0b01010,0b10010,0b11111,0b00010,0b00010],
        '5'=>[0b11111,0b10000,0b11110,0b00001,0b00001,0b10001,0b01110],
        '6'=>[0b00110,0b01000,0b10000,0b11110,0b10001,0b10001,0b01110],
        '7'=>[0b11111,0b00001,0b00010,0b00100,0b01000,0b01000,0b01000],
        '8'=>[0b01110,0b10001,0b10001,0b01110,0b10001,0b10001,0b01110],
        '9'=>[0b01110,0b10001,0b10001,0b01111,0b00001,0b00010,0b01100],
        ':'=>[0b00000,0b00100,0b00000,0b00000,0b00100,0b00000,0b00000],
        ' '=>[0b00000,0b00000,0b00000,0b00000,0b00000,0b00000,0b00000],
        _ => return None,
    })
}
