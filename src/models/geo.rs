//! 坐标几何
//!
//! 扫描范围（Bounds）→ 方框（CoordinateBox）→ 网格（Cell）
//!
//! 所有坐标都按 `min + i * step` 计算，不做浮点累加，
//! 保证每个方框的网格数恰好是 `(size/delta)^2`。

use serde::{Deserialize, Serialize};
use std::fmt::Display;

/// 浮点比较容差
const EPSILON: f64 = 1e-9;

/// 扫描范围
///
/// 上边界是开区间：方框起点 + 边长不能超过上边界
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// 全世界
    pub fn world() -> Self {
        Self {
            min_lat: -90.0,
            max_lat: 90.0,
            min_lng: -180.0,
            max_lng: 180.0,
        }
    }

    /// 美国西部
    pub fn western_usa() -> Self {
        Self {
            min_lat: 30.0,
            max_lat: 50.0,
            min_lng: -125.0,
            max_lng: -100.0,
        }
    }

    /// 洛杉矶地区（只有一个方框）
    pub fn la_area(box_size: f64) -> Self {
        Self {
            min_lat: 34.0,
            max_lat: 34.0 + box_size,
            min_lng: -118.5,
            max_lng: -118.5 + box_size,
        }
    }

    /// 按区域名称解析
    pub fn from_region(name: &str, box_size: f64) -> Option<Self> {
        match name {
            "world" => Some(Self::world()),
            "western_usa" => Some(Self::western_usa()),
            "la_area" => Some(Self::la_area(box_size)),
            _ => None,
        }
    }

    /// 枚举所有完整落在范围内的方框
    ///
    /// 顺序：经度在外层，纬度在内层。超出上边界的方框直接跳过，不生成残缺方框。
    pub fn boxes(&self, box_size: f64) -> Vec<CoordinateBox> {
        let lng_steps = steps_within(self.min_lng, self.max_lng, box_size);
        let lat_steps = steps_within(self.min_lat, self.max_lat, box_size);

        let mut boxes = Vec::with_capacity(lng_steps * lat_steps);
        for i in 0..lng_steps {
            let min_lng = self.min_lng + i as f64 * box_size;
            for j in 0..lat_steps {
                let min_lat = self.min_lat + j as f64 * box_size;
                boxes.push(CoordinateBox::new(min_lat, min_lng, box_size));
            }
        }
        boxes
    }
}

/// 从 `min` 开始、步长为 `size` 的起点中，有多少个满足 `起点 + size <= max`
fn steps_within(min: f64, max: f64, size: f64) -> usize {
    if size <= 0.0 || max - min < size - EPSILON {
        return 0;
    }
    ((max - min) / size + EPSILON).floor() as usize
}

/// 方框：一次扫描的单位
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CoordinateBox {
    pub min_lat: f64,
    pub min_lng: f64,
    pub size: f64,
}

impl CoordinateBox {
    pub fn new(min_lat: f64, min_lng: f64, size: f64) -> Self {
        Self {
            min_lat,
            min_lng,
            size,
        }
    }

    /// 每条边上的网格数
    pub fn cells_per_side(&self, delta: f64) -> usize {
        if delta <= 0.0 {
            return 0;
        }
        (self.size / delta).round() as usize
    }

    /// 预期网格总数 `(size/delta)^2`
    pub fn expected_cells(&self, delta: f64) -> usize {
        let n = self.cells_per_side(delta);
        n * n
    }

    /// 把方框切分为 delta × delta 的网格
    ///
    /// 顺序：纬度在外层，经度在内层
    pub fn cells(&self, delta: f64) -> Vec<Cell> {
        let n = self.cells_per_side(delta);
        let mut cells = Vec::with_capacity(n * n);
        for i in 0..n {
            let lat = self.min_lat + i as f64 * delta;
            for j in 0..n {
                let lng = self.min_lng + j as f64 * delta;
                cells.push(Cell { lat, lng, delta });
            }
        }
        cells
    }
}

impl Display for CoordinateBox {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "纬度 {} 到 {}, 经度 {} 到 {}",
            self.min_lat,
            self.min_lat + self.size,
            self.min_lng,
            self.min_lng + self.size
        )
    }
}

/// 网格：对应一次远程请求
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub lat: f64,
    pub lng: f64,
    pub delta: f64,
}

impl Cell {
    pub fn max_lat(&self) -> f64 {
        self.lat + self.delta
    }

    pub fn max_lng(&self) -> f64 {
        self.lng + self.delta
    }
}

impl Display for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.lat, self.lng)
    }
}
