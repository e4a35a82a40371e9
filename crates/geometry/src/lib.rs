//! # Geometry - Points & Axis-Aligned Rectangles
//!
//! Planar geometry on geographic degrees for the coordinate index: points
//! (`longitude` first), rectangles with possibly-negative extents that
//! normalize to canonical form, intersection and containment tests, and a
//! squared-distance surrogate for sort ordering.
//!
//! Containment is lower-bound inclusive, upper-bound exclusive; callers
//! must not depend on boundary points. All operations other than
//! [`Rect::normalized`] expect normalized rectangles.
//!
//! Longitude wrap: a normalized rectangle whose east edge passes +180°
//! also matches points shifted east by 360°, so a query box straddling the
//! antimeridian behaves as one contiguous region.

/// A geographic point, longitude first.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

impl Point {
    /// Creates a point from `(longitude, latitude)`.
    #[must_use]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// Squared planar Euclidean distance on degrees.
    ///
    /// Not a true great-circle distance, only a monotonic surrogate, which
    /// is all the distance sort needs.
    #[must_use]
    pub fn distance_sq(&self, other: &Point) -> f64 {
        let dx = self.lon - other.lon;
        let dy = self.lat - other.lat;
        dx * dx + dy * dy
    }
}

/// An axis-aligned rectangle stored as origin + extents.
///
/// `width` and `height` may be negative before [`Rect::normalized`] is
/// applied; the canonical form has non-negative extents.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    /// South-west corner once normalized.
    pub origin: Point,
    /// Extent east in degrees.
    pub width: f64,
    /// Extent north in degrees.
    pub height: f64,
}

/// Sentinel covering the whole earth, and the root rectangle of every
/// coordinate shard quadtree. Slightly wider than the valid coordinate
/// range so that boundary points are never excluded by the exclusive
/// upper bound.
pub const WHOLE_EARTH: Rect = Rect {
    origin: Point { lon: -181.0, lat: -91.0 },
    width: 362.0,
    height: 182.0,
};

impl Rect {
    /// Creates a rectangle from origin coordinates and extents.
    #[must_use]
    pub fn new(lon: f64, lat: f64, width: f64, height: f64) -> Self {
        Self {
            origin: Point::new(lon, lat),
            width,
            height,
        }
    }

    /// Creates a normalized rectangle spanning two opposite corners.
    #[must_use]
    pub fn from_corners(a: Point, b: Point) -> Self {
        Rect {
            origin: Point::new(a.lon.min(b.lon), a.lat.min(b.lat)),
            width: (a.lon - b.lon).abs(),
            height: (a.lat - b.lat).abs(),
        }
    }

    /// Returns the canonical form with non-negative extents.
    ///
    /// A negative extent shifts the origin by that extent and negates it,
    /// so the rectangle covers the same region. Idempotent.
    #[must_use]
    pub fn normalized(&self) -> Rect {
        let mut r = *self;
        if r.width < 0.0 {
            r.origin.lon += r.width;
            r.width = -r.width;
        }
        if r.height < 0.0 {
            r.origin.lat += r.height;
            r.height = -r.height;
        }
        r
    }

    /// West edge (inclusive).
    #[must_use]
    pub fn west(&self) -> f64 {
        self.origin.lon
    }

    /// East edge (exclusive).
    #[must_use]
    pub fn east(&self) -> f64 {
        self.origin.lon + self.width
    }

    /// South edge (inclusive).
    #[must_use]
    pub fn south(&self) -> f64 {
        self.origin.lat
    }

    /// North edge (exclusive).
    #[must_use]
    pub fn north(&self) -> f64 {
        self.origin.lat + self.height
    }

    /// South-west corner.
    #[must_use]
    pub fn sw(&self) -> Point {
        Point::new(self.west(), self.south())
    }

    /// South-east corner.
    #[must_use]
    pub fn se(&self) -> Point {
        Point::new(self.east(), self.south())
    }

    /// North-west corner.
    #[must_use]
    pub fn nw(&self) -> Point {
        Point::new(self.west(), self.north())
    }

    /// North-east corner.
    #[must_use]
    pub fn ne(&self) -> Point {
        Point::new(self.east(), self.north())
    }

    /// Midpoint of the rectangle.
    #[must_use]
    pub fn center(&self) -> Point {
        Point::new(
            self.origin.lon + self.width / 2.0,
            self.origin.lat + self.height / 2.0,
        )
    }

    /// Returns `true` if the two normalized rectangles overlap in both
    /// axes. Symmetric.
    #[must_use]
    pub fn intersects(&self, other: &Rect) -> bool {
        self.west() < other.east()
            && other.west() < self.east()
            && self.south() < other.north()
            && other.south() < self.north()
    }

    /// Returns `true` if the normalized rectangle contains the point.
    ///
    /// Lower bounds inclusive, upper bounds exclusive. When the east edge
    /// extends past +180°, the point is also tested shifted east by 360°
    /// (antimeridian wrap).
    #[must_use]
    pub fn contains_point(&self, p: &Point) -> bool {
        if p.lat < self.south() || p.lat >= self.north() {
            return false;
        }
        if p.lon >= self.west() && p.lon < self.east() {
            return true;
        }
        // Query box crosses the +180° meridian; retry the wrapped longitude.
        self.east() > 180.0 && p.lon + 360.0 >= self.west() && p.lon + 360.0 < self.east()
    }
}
