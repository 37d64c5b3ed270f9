//! SVG wiring diagram: microphone board on the left, MCU board on the right,
//! one colored wire per signal.

use crate::config::{BridgeConfig, Mcu};

const WIDTH: u32 = 560;
const HEIGHT: u32 = 320;

const MIC_X: u32 = 20;
const MIC_RIGHT: u32 = 148;
const MCU_X: u32 = 380;

const SCK_COLOR: &str = "#FACC15";
const WS_COLOR: &str = "#FFFFFF";
const SD_COLOR: &str = "#60A5FA";
const VCC_COLOR: &str = "#EF4444";
const GND_COLOR: &str = "#000000";

/// One connection between a microphone pad and an MCU pin.
struct Wire {
    pad: &'static str,
    color: &'static str,
    mic_y: u32,
    mcu_y: u32,
    /// Text next to the MCU pin.
    pin_label: String,
    /// Text drawn along the wire; power rails have none.
    wire_label: Option<String>,
    stroke_width: u32,
    dashed: bool,
}

fn wires(config: &BridgeConfig) -> [Wire; 5] {
    let pins = config.pins;
    [
        Wire {
            pad: "VDD",
            color: VCC_COLOR,
            mic_y: 142,
            mcu_y: 110,
            pin_label: "3.3V / VCC".into(),
            wire_label: None,
            stroke_width: 1,
            dashed: false,
        },
        Wire {
            pad: "SCK",
            color: SCK_COLOR,
            mic_y: 160,
            mcu_y: 140,
            pin_label: format!("GPIO {}", pins.bck),
            wire_label: Some(format!("SCK (GPIO {})", pins.bck)),
            stroke_width: 3,
            dashed: true,
        },
        Wire {
            pad: "WS",
            color: WS_COLOR,
            mic_y: 178,
            mcu_y: 170,
            pin_label: format!("GPIO {}", pins.ws),
            wire_label: Some(format!("WS (GPIO {})", pins.ws)),
            stroke_width: 3,
            dashed: false,
        },
        Wire {
            pad: "SD",
            color: SD_COLOR,
            mic_y: 196,
            mcu_y: 200,
            pin_label: format!("GPIO {}", pins.sd),
            wire_label: Some(format!("SD (GPIO {})", pins.sd)),
            stroke_width: 3,
            dashed: false,
        },
        Wire {
            pad: "GND",
            color: GND_COLOR,
            mic_y: 214,
            mcu_y: 230,
            pin_label: "GND".into(),
            wire_label: None,
            stroke_width: 1,
            dashed: false,
        },
    ]
}

/// How to plug the board into the PC.
pub fn connection_note(mcu: Mcu) -> &'static str {
    match mcu {
        Mcu::Esp32S3 => {
            "For the ESP32-S3 use the \"USB OTG\" port (if the board has two ports) to connect directly to the PC."
        }
        Mcu::Rp2040 => "The Raspberry Pi Pico has native USB. Connect it with a standard cable.",
    }
}

/// Escape text for inclusion in SVG character data or attribute values.
pub fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            c => out.push(c),
        }
    }
    out
}

fn text(x: u32, y: u32, size: u32, fill: &str, content: &str, extra: &str) -> String {
    format!(
        r#"<text x="{x}" y="{y}" font-size="{size}" fill="{fill}" font-family="monospace"{extra}>{}</text>"#,
        escape_xml(content)
    )
}

/// Render a standalone SVG document for `config`.
pub fn render_wiring_diagram(config: &BridgeConfig) -> String {
    let mut svg = Vec::new();
    svg.push(format!(
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}">"#
    ));
    svg.push(format!(
        r##"<rect width="{WIDTH}" height="{HEIGHT}" rx="12" fill="#0F172A" stroke="#334155"/>"##
    ));

    // Microphone board.
    svg.push(format!(
        r##"<rect x="{MIC_X}" y="60" width="{}" height="170" rx="6" fill="#15803D" stroke="#22C55E" stroke-width="2"/>"##,
        MIC_RIGHT - MIC_X
    ));
    svg.push(text(84, 78, 11, "#FFFFFF", "I2S Microphone", r#" text-anchor="middle" font-weight="bold""#));
    svg.push(text(84, 94, 10, "#FFFFFF", config.mic.short_name(), r#" text-anchor="middle""#));
    svg.push(r##"<circle cx="84" cy="116" r="14" fill="#1E293B" stroke="#64748B"/>"##.to_string());

    // MCU board.
    svg.push(format!(
        r##"<rect x="{MCU_X}" y="40" width="160" height="224" rx="6" fill="#1E293B" stroke="#475569" stroke-width="2"/>"##
    ));
    svg.push(r##"<rect x="436" y="32" width="48" height="16" rx="2" fill="#94A3B8" stroke="#64748B"/>"##.to_string());
    svg.push(text(460, 72, 12, "#38BDF8", config.mcu.short_name(), r#" text-anchor="middle" font-weight="bold""#));
    svg.push(text(460, 256, 10, "#64748B", "USB Audio Class Device", r#" text-anchor="middle""#));

    for wire in wires(config) {
        svg.push(format!(
            r#"<circle cx="{}" cy="{}" r="4" fill="{}"/>"#,
            MIC_RIGHT - 10,
            wire.mic_y,
            wire.color
        ));
        svg.push(text(MIC_X + 8, wire.mic_y + 3, 9, "#FFFFFF", wire.pad, ""));

        svg.push(format!(
            r##"<circle cx="{}" cy="{}" r="4" fill="{}" stroke="#475569"/>"##,
            MCU_X + 14,
            wire.mcu_y,
            wire.color
        ));
        svg.push(text(MCU_X + 26, wire.mcu_y + 3, 9, "#CBD5E1", &wire.pin_label, ""));

        let dash = if wire.dashed { r#" stroke-dasharray="4 2""# } else { "" };
        let opacity = if wire.wire_label.is_none() { r#" opacity="0.5""# } else { "" };
        svg.push(format!(
            r#"<path d="M {x0} {y0} C {c0} {y0}, {c1} {y1}, {x1} {y1}" stroke="{color}" stroke-width="{w}" fill="none"{dash}{opacity}/>"#,
            x0 = MIC_RIGHT - 10,
            y0 = wire.mic_y,
            c0 = MIC_RIGHT + 70,
            c1 = MCU_X - 70,
            x1 = MCU_X + 14,
            y1 = wire.mcu_y,
            color = wire.color,
            w = wire.stroke_width,
        ));
        if let Some(label) = &wire.wire_label {
            let y = (wire.mic_y + wire.mcu_y) / 2 - 6;
            svg.push(text(210, y, 10, wire.color, label, ""));
        }
    }

    svg.push(text(20, 290, 10, "#94A3B8", connection_note(config.mcu), ""));
    svg.push("</svg>".to_string());
    svg.join("\n")
}
