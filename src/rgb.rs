use rand::Rng;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rgb
{
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb
{
    pub const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub fn random(rng: &mut impl Rng) -> Self
    {
        Self {
            r: rng.gen_range(0..=255),
            g: rng.gen_range(0..=255),
            b: rng.gen_range(0..=255),
        }
    }

    pub fn hex(&self) -> String
    {
        format!("#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

pub fn ansi_fg(color: Rgb) -> String
{
    format!("\x1b[38;2;{};{};{}m", color.r, color.g, color.b)
}

pub fn ansi_bg(color: Rgb) -> String
{
    format!("\x1b[48;2;{};{};{}m", color.r, color.g, color.b)
}

pub const ANSI_RESET: &str = "\x1b[0m";
