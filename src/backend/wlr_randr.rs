use crate::backend::{Backend, monitor_uuid};
use crate::types::LiveMonitor;
use log::debug;
use serde::Deserialize;

pub struct WlrRandrBackend {
    executable: String,
}

impl WlrRandrBackend {
    pub fn new(executable: String) -> Self {
        Self { executable }
    }
}

impl Backend for WlrRandrBackend {
    fn get_live_monitors(&self) -> anyhow::Result<Vec<LiveMonitor>> {
        let mut cmd = std::process::Command::new(&self.executable);
        cmd.arg("--json");

        debug!("Executing {:?}", cmd);
        let output = cmd.output()?;
        if !output.status.success() {
            return Err(anyhow::anyhow!("wlr-randr failed"));
        }
        parse_monitors(&output.stdout)
    }
}

fn parse_monitors(json: &[u8]) -> anyhow::Result<Vec<LiveMonitor>> {
    let heads: Vec<WlrRandrHead> = serde_json::from_slice(json)?;
    Ok(heads.into_iter().map(WlrRandrHead::make_live_monitor).collect())
}

#[derive(Debug, Deserialize)]
struct WlrRandrHead {
    name: String,
    make: Option<String>,
    model: Option<String>,
    serial: Option<String>,
    enabled: bool,
    position: Option<WlrRandrHeadPosition>,
    modes: Vec<WlrRandrHeadMode>,
    transform: Option<String>,
}
#[derive(Debug, Deserialize)]
struct WlrRandrHeadMode {
    width: i32,
    height: i32,
    refresh: f64,
    current: bool,
}
#[derive(Debug, Deserialize)]
struct WlrRandrHeadPosition {
    x: i32,
    y: i32,
}
impl WlrRandrHead {
    fn make_live_monitor(self) -> LiveMonitor {
        let make = self.make.unwrap_or_default();
        let model = self.model.unwrap_or_default();
        let serial = self.serial.unwrap_or_default();

        // Disabled outputs usually have no current mode
        let mode = self
            .modes
            .iter()
            .find(|m| m.current)
            .or_else(|| self.modes.first());

        LiveMonitor {
            uuid: monitor_uuid(&make, &model, &serial, &self.name),
            make,
            model,
            serial,
            enabled: self.enabled && mode.is_some(),
            x: self.position.as_ref().map(|p| p.x).unwrap_or(0),
            y: self.position.as_ref().map(|p| p.y).unwrap_or(0),
            width: mode.map(|m| m.width).unwrap_or(0),
            height: mode.map(|m| m.height).unwrap_or(0),
            refresh_rate: mode.map(|m| m.refresh).unwrap_or(0.0),
            transform: match self.transform.as_deref().unwrap_or_default() {
                "90" => 1,
                "180" => 2,
                "270" => 3,
                "flipped" => 4,
                "flipped-90" => 5,
                "flipped-180" => 6,
                "flipped-270" => 7,
                _ => 0,
            },
            name: self.name,
        }
    }
}
