//! Screen layout for the 296x128 landscape panel.
//!
//! ```text
//! (0,0)   SATORI heading           price, right side (x shifts left for long prices)
//! (0,40)  SATORI balance, large
//! (0,80)  EVR: balance
//! (0,100) 24h: +x.xx%              LOLLIPOP marker at (261,86) when held
//! (0,112) Updated: HH:MM date
//! (0,120) V: version NEURONS: n STAKE: s
//! ```
//!
//! Text uses a 5x8 font scaled by whole factors, so every line lands on the
//! same 8 pixel grid as the panel's byte rows.

use embedded_graphics::{
    mono_font::{ascii::FONT_5X8, MonoTextStyle},
    pixelcolor::BinaryColor,
    prelude::*,
    primitives::{Circle, Line, PrimitiveStyle, Rectangle},
    text::{Baseline, Text},
};

use crate::snapshot::Snapshot;

const GLYPH_WIDTH: i32 = 5;

pub const HEADING_ORIGIN: Point = Point::new(0, 0);
pub const BALANCE_ORIGIN: Point = Point::new(0, 40);
pub const EVR_ORIGIN: Point = Point::new(0, 80);
pub const CHANGE_ORIGIN: Point = Point::new(0, 100);
pub const UPDATED_ORIGIN: Point = Point::new(0, 112);
pub const STATS_ORIGIN: Point = Point::new(0, 120);
pub const LOLLIPOP_ORIGIN: Point = Point::new(261, 86);

/// Price column for short prices
const PRICE_X: i32 = 200;
/// Price strings longer than this push the column left
const PRICE_SHORT_LEN: usize = 5;
const PRICE_SCALE: u32 = 2;

/// Everything drawn on one frame
#[derive(Debug, Clone, PartialEq)]
pub struct ScreenData<'a> {
    pub snapshot: &'a Snapshot,
    /// Preformatted local time, e.g. `22:07 05/03/24`
    pub updated: &'a str,
    /// Price change over the history window, in percent
    pub price_change: Option<f64>,
}

/// Draw target adapter that magnifies every pixel into a `factor` square
/// placed relative to `origin`.
pub struct Scaled<'a, D> {
    target: &'a mut D,
    origin: Point,
    factor: u32,
}

impl<'a, D> Scaled<'a, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    pub fn new(target: &'a mut D, origin: Point, factor: u32) -> Self {
        Self {
            target,
            origin,
            factor: factor.max(1),
        }
    }
}

impl<D> OriginDimensions for Scaled<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    fn size(&self) -> Size {
        let full = self.target.bounding_box().size;
        Size::new(full.width / self.factor, full.height / self.factor)
    }
}

impl<D> DrawTarget for Scaled<'_, D>
where
    D: DrawTarget<Color = BinaryColor>,
{
    type Color = BinaryColor;
    type Error = D::Error;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let f = self.factor as i32;
        for Pixel(point, color) in pixels {
            let corner = self.origin + Point::new(point.x * f, point.y * f);
            self.target
                .fill_solid(&Rectangle::new(corner, Size::new_equal(self.factor)), color)?;
        }
        Ok(())
    }
}

/// Draw `text` with its top-left corner at `origin`, magnified `scale` times
pub fn draw_scaled_text<D>(target: &mut D, text: &str, origin: Point, scale: u32) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let style = MonoTextStyle::new(&FONT_5X8, BinaryColor::On);
    let mut scaled = Scaled::new(target, origin, scale);
    Text::with_baseline(text, Point::zero(), style, Baseline::Top).draw(&mut scaled)?;
    Ok(())
}

/// Price text and its x position; longer strings move left so they stay on
/// screen.
pub fn price_label(price: f64) -> (String, i32) {
    let digits = format!("{}", price);
    let overflow = digits.len().saturating_sub(PRICE_SHORT_LEN) as i32;
    let x = PRICE_X - overflow * GLYPH_WIDTH * PRICE_SCALE as i32;
    (format!("${}", digits), x)
}

pub fn stats_line(snapshot: &Snapshot) -> String {
    let version = snapshot.neuron_version.as_deref().unwrap_or("Unknown");
    let neurons = snapshot
        .competing_neuron_count
        .map(|n| n.to_string())
        .unwrap_or_else(|| String::from("-"));
    let stake = snapshot
        .stake_requirement
        .map(|s| s.to_string())
        .unwrap_or_else(|| String::from("-"));
    format!("V: {} NEURONS: {} STAKE: {}", version, neurons, stake)
}

/// Render the whole screen onto a cleared target
pub fn render<D>(target: &mut D, data: &ScreenData<'_>) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let snapshot = data.snapshot;
    target.clear(BinaryColor::Off)?;

    draw_scaled_text(target, "SATORI", HEADING_ORIGIN, 3)?;
    draw_scaled_text(
        target,
        &format!("{:.2}", snapshot.asset_balances.satori),
        BALANCE_ORIGIN,
        3,
    )?;

    if let Some(price) = snapshot.price {
        let (label, x) = price_label(price);
        draw_scaled_text(target, &label, Point::new(x, 0), PRICE_SCALE)?;
    }

    draw_scaled_text(
        target,
        &format!("EVR: {:.2}", snapshot.balance),
        EVR_ORIGIN,
        2,
    )?;

    if let Some(change) = data.price_change {
        draw_scaled_text(target, &format!("24h: {:+.2}%", change), CHANGE_ORIGIN, 1)?;
    }

    draw_scaled_text(
        target,
        &format!("Updated: {}", data.updated),
        UPDATED_ORIGIN,
        1,
    )?;

    if snapshot.has_network_stats() {
        draw_scaled_text(target, &stats_line(snapshot), STATS_ORIGIN, 1)?;
    }

    if snapshot.asset_balances.lollipop > 0.0 {
        draw_lollipop(target, LOLLIPOP_ORIGIN)?;
    }
    Ok(())
}

/// 32x32 lollipop marker: candy disc with a swirl on a stick
fn draw_lollipop<D>(target: &mut D, origin: Point) -> Result<(), D::Error>
where
    D: DrawTarget<Color = BinaryColor>,
{
    let ink = PrimitiveStyle::with_stroke(BinaryColor::On, 2);
    Line::new(origin + Point::new(16, 20), origin + Point::new(16, 31))
        .into_styled(ink)
        .draw(target)?;
    Circle::new(origin + Point::new(4, 0), 24)
        .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
        .draw(target)?;
    Circle::new(origin + Point::new(10, 6), 12)
        .into_styled(PrimitiveStyle::with_stroke(BinaryColor::Off, 2))
        .draw(target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::AssetBalances;
    use ssd1680::{Color, Dimensions, FrameBuffer};

    fn snapshot() -> Snapshot {
        Snapshot {
            timestamp: 0,
            balance: 12.345,
            asset_balances: AssetBalances {
                satori: 1234.5,
                lollipop: 0.0,
            },
            price: Some(0.0523),
            neuron_version: Some("0.3.9".into()),
            competing_neuron_count: Some(1543),
            stake_requirement: None,
        }
    }

    fn frame() -> FrameBuffer<Vec<u8>> {
        FrameBuffer::new(
            vec![0u8; Dimensions::PANEL_2IN9.buffer_size()],
            Dimensions::PANEL_2IN9,
        )
        .unwrap()
    }

    fn ink_in(frame: &FrameBuffer<Vec<u8>>, area: Rectangle) -> usize {
        area.points()
            .filter(|p| frame.pixel(p.x, p.y) == Some(Color::Black))
            .count()
    }

    #[test]
    fn price_shifts_left_when_long() {
        assert_eq!(price_label(1.5), (String::from("$1.5"), 200));
        assert_eq!(price_label(0.0523), (String::from("$0.0523"), 190));
        assert_eq!(price_label(0.012345), (String::from("$0.012345"), 170));
    }

    #[test]
    fn stats_line_marks_missing_fields() {
        assert_eq!(
            stats_line(&snapshot()),
            "V: 0.3.9 NEURONS: 1543 STAKE: -"
        );
    }

    #[test]
    fn scaled_pixels_are_squares() {
        let mut frame = frame();
        frame.fill(Color::White);
        let mut scaled = Scaled::new(&mut frame, Point::new(8, 16), 3);
        Pixel(Point::new(1, 1), BinaryColor::On)
            .draw(&mut scaled)
            .unwrap();
        assert_eq!(
            ink_in(&frame, Rectangle::new(Point::new(11, 19), Size::new(3, 3))),
            9
        );
        assert_eq!(ink_in(&frame, Rectangle::new(Point::zero(), Size::new(296, 128))), 9);
    }

    #[test]
    fn render_places_sections() {
        let mut frame = frame();
        let snap = snapshot();
        render(
            &mut frame,
            &ScreenData {
                snapshot: &snap,
                updated: "22:07 05/03/24",
                price_change: Some(-1.5),
            },
        )
        .unwrap();

        // heading, balance, price, EVR, change, updated, stats all inked
        for area in [
            Rectangle::new(HEADING_ORIGIN, Size::new(90, 24)),
            Rectangle::new(BALANCE_ORIGIN, Size::new(105, 24)),
            Rectangle::new(Point::new(190, 0), Size::new(70, 16)),
            Rectangle::new(EVR_ORIGIN, Size::new(100, 16)),
            Rectangle::new(CHANGE_ORIGIN, Size::new(60, 8)),
            Rectangle::new(UPDATED_ORIGIN, Size::new(120, 8)),
            Rectangle::new(STATS_ORIGIN, Size::new(150, 8)),
        ] {
            assert!(ink_in(&frame, area) > 0, "{:?}", area);
        }
        // no lollipop held
        assert_eq!(
            ink_in(&frame, Rectangle::new(LOLLIPOP_ORIGIN, Size::new(32, 32))),
            0
        );
    }

    #[test]
    fn lollipop_marker_when_held() {
        let mut frame = frame();
        let mut snap = snapshot();
        snap.asset_balances.lollipop = 1.0;
        render(
            &mut frame,
            &ScreenData {
                snapshot: &snap,
                updated: "",
                price_change: None,
            },
        )
        .unwrap();
        assert!(ink_in(&frame, Rectangle::new(LOLLIPOP_ORIGIN, Size::new(32, 32))) > 100);
        assert_eq!(ink_in(&frame, Rectangle::new(CHANGE_ORIGIN, Size::new(60, 8))), 0);
    }
}
