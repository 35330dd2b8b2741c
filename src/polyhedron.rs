use grid::*;
use log::debug;
use num_bigint::BigInt;
use num_integer::Integer;
use num_rational::BigRational;
use num_traits::{One, Signed, ToPrimitive, Zero};

use super::*;

pub type Rational = BigRational;

/// A constraint `a·x >= b` or `a·x = b`, stored as `(a, b)`.
type Row = (Vec<Rational>, Rational);

/// The set `{ x : A x >= b, E x = e }` with exact rational coefficients.
///
/// Row `r` of `inequalities` is the coefficient vector of the constraint
/// whose right hand side is `inequality_bounds[r]`, and likewise for equalities.
#[derive(Clone, Debug, PartialEq)]
pub struct Polyhedron {
    dimension: usize,
    inequalities: Grid<Rational>,
    inequality_bounds: Vec<Rational>,
    equalities: Grid<Rational>,
    equality_bounds: Vec<Rational>,
}

impl Polyhedron {
    pub fn new(
        dimension: usize,
        inequalities: Grid<Rational>,
        inequality_bounds: Vec<Rational>,
        equalities: Grid<Rational>,
        equality_bounds: Vec<Rational>,
    ) -> Self {
        debug_assert_eq!(inequalities.rows(), inequality_bounds.len());
        debug_assert_eq!(equalities.rows(), equality_bounds.len());
        debug_assert!(inequalities.rows() == 0 || inequalities.cols() == dimension);
        debug_assert!(equalities.rows() == 0 || equalities.cols() == dimension);
        Polyhedron {
            dimension,
            inequalities,
            inequality_bounds,
            equalities,
            equality_bounds,
        }
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    pub fn inequalities(&self) -> (&Grid<Rational>, &[Rational]) {
        (&self.inequalities, &self.inequality_bounds)
    }

    pub fn equalities(&self) -> (&Grid<Rational>, &[Rational]) {
        (&self.equalities, &self.equality_bounds)
    }

    pub fn contains(&self, point: &[Rational]) -> bool {
        debug_assert_eq!(point.len(), self.dimension);
        (0..self.inequalities.rows())
            .all(|r| dot(self.inequalities.iter_row(r), point) >= self.inequality_bounds[r])
            && (0..self.equalities.rows())
                .all(|r| dot(self.equalities.iter_row(r), point) == self.equality_bounds[r])
    }

    fn system(&self) -> System {
        let rows = |grid: &Grid<Rational>, bounds: &[Rational]| {
            (0..grid.rows())
                .map(|r| (grid.iter_row(r).cloned().collect(), bounds[r].clone()))
                .collect()
        };
        System {
            dimension: self.dimension,
            inequalities: rows(&self.inequalities, &self.inequality_bounds),
            equalities: rows(&self.equalities, &self.equality_bounds),
        }
    }
}

/// Exact polyhedral computations needed by core queries.
pub trait PolyhedronBackend {
    /// Vertices of the polyhedron, without repetitions.
    fn vertices(&self, polyhedron: &Polyhedron) -> Result<Vec<Vec<Rational>>>;

    fn is_empty(&self, polyhedron: &Polyhedron) -> Result<bool> {
        Ok(self.vertices(polyhedron)?.is_empty())
    }

    fn contains_integer_point(&self, polyhedron: &Polyhedron) -> Result<bool>;
}

/// Stands in for a polyhedral library that is not present: every query fails.
#[derive(Copy, Clone, Debug, Default)]
pub struct UnavailableBackend;

impl PolyhedronBackend for UnavailableBackend {
    fn vertices(&self, _polyhedron: &Polyhedron) -> Result<Vec<Vec<Rational>>> {
        Err(GameError::Unavailable("polyhedral backend"))
    }

    fn contains_integer_point(&self, _polyhedron: &Polyhedron) -> Result<bool> {
        Err(GameError::Unavailable("polyhedral backend"))
    }
}

/// Pure Rust backend working on [`BigRational`]s.
///
/// - Emptiness is a phase one simplex run, so it scales with the size of the
///   constraint matrix: cores of games with a dozen players are decided in seconds.
/// - Vertices come from the double description method on the homogenized cone.
///   The output itself is large (a convex game of `n` players can have `n!` core
///   vertices), so enumeration is practical up to about 7 players.
/// - Integer points are found by branch and bound on the exact linear relaxation,
///   after a divisibility test on every equality. The polyhedron must be bounded.
///
/// Vertex enumeration requires a pointed polyhedron; every core is pointed.
#[derive(Copy, Clone, Debug, Default)]
pub struct ExactBackend;

impl PolyhedronBackend for ExactBackend {
    fn vertices(&self, polyhedron: &Polyhedron) -> Result<Vec<Vec<Rational>>> {
        let system = polyhedron.system();
        let dimension = system.dimension;
        // (a, b) becomes (a, -b) on y = (x, t): a·x >= b t
        let homogeneous = |(a, b): &Row| a.iter().cloned().chain([-b.clone()]).collect::<Vec<_>>();

        let mut cone = Cone::new(dimension + 1);
        for row in &system.equalities {
            cone.add_equality(&homogeneous(row));
        }
        let mut t = vec![Rational::zero(); dimension + 1];
        t[dimension] = Rational::one();
        cone.add_inequality(&t);
        for row in &system.inequalities {
            cone.add_inequality(&homogeneous(row));
        }
        if !cone.lineality.is_empty() {
            return Err(GameError::NotPointed);
        }

        let mut vertices = cone
            .rays
            .iter()
            .filter(|ray| ray.direction[dimension].is_positive())
            .map(|ray| {
                let t = &ray.direction[dimension];
                ray.direction[..dimension].iter().map(|x| x / t).collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        vertices.sort();
        vertices.dedup();
        debug!(
            "Found {} vertices and {} extreme rays in dimension {dimension} from {} inequalities",
            vertices.len(),
            cone.rays.len() - vertices.len(),
            system.inequalities.len()
        );
        Ok(vertices)
    }

    fn is_empty(&self, polyhedron: &Polyhedron) -> Result<bool> {
        Ok(matches!(minimize(&polyhedron.system(), None), Optimum::Infeasible))
    }

    fn contains_integer_point(&self, polyhedron: &Polyhedron) -> Result<bool> {
        let system = polyhedron.system();
        if !system.equalities.iter().all(admits_integer_solution) {
            debug!("An equality has no integer solution");
            return Ok(false);
        }
        let dimension = system.dimension;
        for j in 0..dimension {
            for sign in [1, -1] {
                match minimize(&system, Some(&unit(dimension, j, sign))) {
                    Optimum::Infeasible => return Ok(false),
                    Optimum::Unbounded => return Err(GameError::Unbounded),
                    Optimum::Point(_) => {}
                }
            }
        }

        let mut pending = vec![system];
        let mut relaxations = 0usize;
        while let Some(node) = pending.pop() {
            relaxations += 1;
            let Optimum::Point(point) = minimize(&node, None) else {
                continue;
            };
            let Some(j) = point.iter().position(|x| !x.is_integer()) else {
                debug!("Integer point {point:?} found after {relaxations} relaxations");
                return Ok(true);
            };
            let mut below = node.clone();
            below.inequalities.push((unit(dimension, j, -1), -point[j].floor()));
            let mut above = node;
            above.inequalities.push((unit(dimension, j, 1), point[j].ceil()));
            pending.push(below);
            pending.push(above);
        }
        debug!("No integer point after {relaxations} relaxations");
        Ok(false)
    }
}

/// Owned constraint rows; the integer search extends them with branching cuts.
#[derive(Clone, Debug)]
struct System {
    dimension: usize,
    inequalities: Vec<Row>,
    equalities: Vec<Row>,
}

enum Optimum {
    Infeasible,
    Unbounded,
    Point(Vec<Rational>),
}

/// Minimizes `cost · x` over `system`, or returns any feasible point when `cost` is `None`.
fn minimize(system: &System, cost: Option<&[Rational]>) -> Optimum {
    let mut tableau = Tableau::new(system);
    if !tableau.phase_one() {
        return Optimum::Infeasible;
    }
    if let Some(cost) = cost
        && !tableau.phase_two(cost)
    {
        return Optimum::Unbounded;
    }
    Optimum::Point(tableau.point())
}

/// Dense simplex tableau over `x = x⁺ - x⁻` with `x⁺, x⁻ >= 0`.
///
/// Columns are `x⁺`, `x⁻`, one surplus per inequality, then one artificial per row
/// whose surplus cannot start in the basis. The last entry of a row is its right hand side.
/// Pivots follow Bland's rule, so degenerate problems cannot cycle.
struct Tableau {
    dimension: usize,
    width: usize,
    first_artificial: usize,
    rows: Vec<Vec<Rational>>,
    basis: Vec<usize>,
}

impl Tableau {
    fn new(system: &System) -> Self {
        let dimension = system.dimension;
        let surpluses = system.inequalities.len();
        let first_artificial = 2 * dimension + surpluses;
        let needs_artificial = |i: usize, b: &Rational| i >= surpluses || b.is_positive();
        let all = system.inequalities.iter().chain(&system.equalities).enumerate();
        let artificials = all.clone().filter(|(i, (_, b))| needs_artificial(*i, b)).count();
        let width = first_artificial + artificials + 1;

        let mut rows = Vec::with_capacity(surpluses + system.equalities.len());
        let mut basis = Vec::with_capacity(rows.capacity());
        let mut next_artificial = first_artificial;
        for (i, (a, b)) in all {
            let mut row = vec![Rational::zero(); width];
            for (j, x) in a.iter().enumerate() {
                row[j] = x.clone();
                row[dimension + j] = -x.clone();
            }
            if i < surpluses {
                row[2 * dimension + i] = -Rational::one();
            }
            row[width - 1] = b.clone();
            let artificial = needs_artificial(i, b);
            // right hand sides are kept non-negative
            if b.is_negative() || !artificial {
                for x in row.iter_mut() {
                    *x = -x.clone();
                }
            }
            if artificial {
                row[next_artificial] = Rational::one();
                basis.push(next_artificial);
                next_artificial += 1;
            } else {
                basis.push(2 * dimension + i);
            }
            rows.push(row);
        }
        Tableau {
            dimension,
            width,
            first_artificial,
            rows,
            basis,
        }
    }

    fn rhs(&self) -> usize {
        self.width - 1
    }

    fn pivot(&mut self, objective: &mut [Rational], row: usize, col: usize) {
        let pivot = self.rows[row][col].clone();
        for x in self.rows[row].iter_mut() {
            *x /= &pivot;
        }
        let pivot_row = self.rows[row].clone();
        for (r, other) in self.rows.iter_mut().enumerate() {
            if r != row {
                eliminate(other, &pivot_row, col);
            }
        }
        eliminate(objective, &pivot_row, col);
        self.basis[row] = col;
    }

    /// Minimizes the reduced costs in `objective`, letting only the first `columns` columns enter.
    /// Returns `false` when the objective is unbounded below.
    fn run(&mut self, objective: &mut [Rational], columns: usize) -> bool {
        let rhs = self.rhs();
        loop {
            let Some(col) = (0..columns).find(|&j| objective[j].is_negative()) else {
                return true;
            };
            let mut leaving: Option<(usize, Rational)> = None;
            for (r, row) in self.rows.iter().enumerate() {
                if !row[col].is_positive() {
                    continue;
                }
                let ratio = &row[rhs] / &row[col];
                let replace = match &leaving {
                    None => true,
                    Some((best, best_ratio)) => {
                        ratio < *best_ratio || (ratio == *best_ratio && self.basis[r] < self.basis[*best])
                    }
                };
                if replace {
                    leaving = Some((r, ratio));
                }
            }
            let Some((row, _)) = leaving else {
                return false;
            };
            self.pivot(objective, row, col);
        }
    }

    /// Drives the artificials to zero; on success they are all out of the basis.
    fn phase_one(&mut self) -> bool {
        let rhs = self.rhs();
        let mut objective = vec![Rational::zero(); self.width];
        for x in &mut objective[self.first_artificial..rhs] {
            *x = Rational::one();
        }
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic >= self.first_artificial {
                for (o, x) in objective.iter_mut().zip(row) {
                    *o -= x;
                }
            }
        }
        let bounded = self.run(&mut objective, self.first_artificial);
        debug_assert!(bounded);
        if !objective[rhs].is_zero() {
            return false;
        }

        let mut r = 0;
        while r < self.rows.len() {
            if self.basis[r] < self.first_artificial {
                r += 1;
                continue;
            }
            match (0..self.first_artificial).find(|&j| !self.rows[r][j].is_zero()) {
                Some(col) => {
                    self.pivot(&mut objective, r, col);
                    r += 1;
                }
                // redundant row
                None => {
                    self.rows.remove(r);
                    self.basis.remove(r);
                }
            }
        }
        true
    }

    fn phase_two(&mut self, cost: &[Rational]) -> bool {
        let dimension = self.dimension;
        let mut costs = vec![Rational::zero(); self.width];
        for (j, c) in cost.iter().enumerate() {
            costs[j] = c.clone();
            costs[dimension + j] = -c.clone();
        }
        let mut objective = costs.clone();
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            let c = &costs[basic];
            if c.is_zero() {
                continue;
            }
            for (o, x) in objective.iter_mut().zip(row) {
                *o -= c * x;
            }
        }
        self.run(&mut objective, self.first_artificial)
    }

    /// The basic solution, projected back to `x`.
    fn point(&self) -> Vec<Rational> {
        let dimension = self.dimension;
        let rhs = self.rhs();
        let mut values = vec![Rational::zero(); 2 * dimension];
        for (row, &basic) in self.rows.iter().zip(&self.basis) {
            if basic < 2 * dimension {
                values[basic] = row[rhs].clone();
            }
        }
        (0..dimension).map(|j| &values[j] - &values[dimension + j]).collect()
    }
}

/// Indices of the inequalities a ray makes tight, one bit each.
#[derive(Clone, Debug, Default, PartialEq)]
struct ConstraintSet(Vec<u64>);

impl ConstraintSet {
    /// The set `{0, ..., count - 1}`.
    fn first(count: usize) -> Self {
        let mut set = ConstraintSet(vec![0; count.div_ceil(64)]);
        for index in 0..count {
            set.insert(index);
        }
        set
    }

    fn insert(&mut self, index: usize) {
        let word = index / 64;
        if self.0.len() <= word {
            self.0.resize(word + 1, 0);
        }
        self.0[word] |= 1u64 << (index % 64);
    }

    fn intersection(&self, other: &ConstraintSet) -> ConstraintSet {
        ConstraintSet(self.0.iter().zip(&other.0).map(|(a, b)| a & b).collect())
    }

    fn len(&self) -> usize {
        self.0.iter().map(|word| word.count_ones() as usize).sum()
    }

    fn is_subset(&self, other: &ConstraintSet) -> bool {
        self.0
            .iter()
            .enumerate()
            .all(|(i, word)| (word & !other.0.get(i).copied().unwrap_or(0)) == 0)
    }
}

#[derive(Clone, Debug)]
struct Ray {
    direction: Vec<Rational>,
    tight: ConstraintSet,
}

/// Double description of `{ y : h·y >= 0 for every inequality, h·y = 0 for every equality }`:
/// a basis of the lineality space plus the extreme rays.
///
/// Rays on opposite sides of a new constraint are combined only when adjacent,
/// which is decided combinatorially from the constraints tight at both.
struct Cone {
    dimension: usize,
    lineality: Vec<Vec<Rational>>,
    rays: Vec<Ray>,
    inequalities: usize,
}

impl Cone {
    /// The whole space.
    fn new(dimension: usize) -> Self {
        Cone {
            dimension,
            lineality: (0..dimension).map(|i| unit(dimension, i, 1)).collect(),
            rays: Vec::new(),
            inequalities: 0,
        }
    }

    fn add_inequality(&mut self, h: &[Rational]) {
        let index = self.inequalities;
        self.inequalities += 1;
        if let Some(line) = self.split_lineality(h) {
            for ray in self.rays.iter_mut() {
                ray.tight.insert(index);
            }
            self.rays.push(Ray {
                direction: line,
                tight: ConstraintSet::first(index),
            });
            return;
        }
        let signs = self.signs(h);
        let mut rays = self.combine(&signs, Some(index));
        for (ray, sign) in self.rays.iter().zip(&signs) {
            if sign.is_positive() {
                rays.push(ray.clone());
            } else if sign.is_zero() {
                let mut ray = ray.clone();
                ray.tight.insert(index);
                rays.push(ray);
            }
        }
        self.rays = rays;
    }

    fn add_equality(&mut self, h: &[Rational]) {
        if self.split_lineality(h).is_some() {
            return;
        }
        let signs = self.signs(h);
        let mut rays = self.combine(&signs, None);
        rays.extend(
            self.rays
                .iter()
                .zip(&signs)
                .filter(|(_, sign)| sign.is_zero())
                .map(|(ray, _)| ray.clone()),
        );
        self.rays = rays;
    }

    /// Takes out of the lineality space a line crossing `h`, oriented so that `h·l > 0`,
    /// and moves every other generator onto `h·y = 0` along it.
    fn split_lineality(&mut self, h: &[Rational]) -> Option<Vec<Rational>> {
        let index = self.lineality.iter().position(|l| !dot(l, h).is_zero())?;
        let mut line = self.lineality.swap_remove(index);
        let mut scale = dot(&line, h);
        if scale.is_negative() {
            for x in line.iter_mut() {
                *x = -x.clone();
            }
            scale = -scale;
        }
        for l in self.lineality.iter_mut() {
            let factor = dot(&*l, h) / &scale;
            subtract_multiple(l, &line, &factor);
        }
        for ray in self.rays.iter_mut() {
            let factor = dot(&ray.direction, h) / &scale;
            subtract_multiple(&mut ray.direction, &line, &factor);
            normalize(&mut ray.direction);
        }
        Some(line)
    }

    fn signs(&self, h: &[Rational]) -> Vec<Rational> {
        self.rays.iter().map(|ray| dot(&ray.direction, h)).collect()
    }

    /// Dimension of the cone modulo its lineality space.
    fn pointed_dimension(&self) -> usize {
        let mut generators = self
            .rays
            .iter()
            .map(|ray| ray.direction.clone())
            .chain(self.lineality.iter().cloned())
            .collect::<Vec<_>>();
        row_reduce(&mut generators, self.dimension) - self.lineality.len()
    }

    /// New rays on the hyperplane of a constraint, one per adjacent pair of rays on opposite sides.
    fn combine(&self, signs: &[Rational], index: Option<usize>) -> Vec<Ray> {
        let positive = (0..signs.len()).filter(|&r| signs[r].is_positive()).collect::<Vec<_>>();
        let negative = (0..signs.len()).filter(|&r| signs[r].is_negative()).collect::<Vec<_>>();
        if positive.is_empty() || negative.is_empty() {
            return Vec::new();
        }
        // the face spanned by two adjacent rays has pointed dimension 2
        let needed = self.pointed_dimension().saturating_sub(2);
        let mut rays = Vec::new();
        for &p in &positive {
            for &n in &negative {
                let common = self.rays[p].tight.intersection(&self.rays[n].tight);
                if common.len() < needed {
                    continue;
                }
                let blocked = self
                    .rays
                    .iter()
                    .enumerate()
                    .any(|(r, ray)| r != p && r != n && common.is_subset(&ray.tight));
                if blocked {
                    continue;
                }
                let mut direction = self.rays[n].direction.iter().map(|x| x * &signs[p]).collect::<Vec<_>>();
                subtract_multiple(&mut direction, &self.rays[p].direction, &signs[n]);
                normalize(&mut direction);
                let mut tight = common;
                if let Some(index) = index {
                    tight.insert(index);
                }
                rays.push(Ray { direction, tight });
            }
        }
        rays
    }
}

fn dot<'a>(a: impl IntoIterator<Item = &'a Rational>, b: &[Rational]) -> Rational {
    a.into_iter().zip(b).fold(Rational::zero(), |acc, (x, y)| acc + x * y)
}

fn unit(dimension: usize, index: usize, sign: i64) -> Vec<Rational> {
    let mut e = vec![Rational::zero(); dimension];
    e[index] = Rational::from_integer(BigInt::from(sign));
    e
}

/// `v -= factor * w`
fn subtract_multiple(v: &mut [Rational], w: &[Rational], factor: &Rational) {
    if factor.is_zero() {
        return;
    }
    for (x, y) in v.iter_mut().zip(w) {
        if !y.is_zero() {
            *x -= factor * y;
        }
    }
}

/// Subtracts from `target` the multiple of `pivot_row` that clears column `col`.
fn eliminate(target: &mut [Rational], pivot_row: &[Rational], col: usize) {
    let factor = target[col].clone();
    subtract_multiple(target, pivot_row, &factor);
}

/// Scales a direction so that its first non-zero entry is `±1`.
fn normalize(v: &mut [Rational]) {
    let Some(scale) = v.iter().find(|x| !x.is_zero()).map(|x| x.abs()) else {
        return;
    };
    for x in v.iter_mut() {
        *x /= &scale;
    }
}

/// Brings the first `cols` columns of `rows` to reduced row echelon form and returns the rank.
fn row_reduce(rows: &mut [Vec<Rational>], cols: usize) -> usize {
    let mut rank = 0;
    for col in 0..cols {
        if rank == rows.len() {
            break;
        }
        let Some(p) = (rank..rows.len()).find(|&r| !rows[r][col].is_zero()) else {
            continue;
        };
        rows.swap(rank, p);
        let pivot = rows[rank][col].clone();
        for a in rows[rank].iter_mut() {
            *a /= &pivot;
        }
        let pivot_row = rows[rank].clone();
        for (r, row) in rows.iter_mut().enumerate() {
            if r != rank {
                eliminate(row, &pivot_row, col);
            }
        }
        rank += 1;
    }
    rank
}

/// Once scaled to integers, `a·x = b` has an integer solution iff the gcd of `a` divides `b`.
fn admits_integer_solution((a, b): &Row) -> bool {
    let lcm = a.iter().chain([b]).fold(BigInt::one(), |l, x| l.lcm(x.denom()));
    let scale = Rational::from_integer(lcm);
    let scaled = |x: &Rational| (x * &scale).to_integer();
    let gcd = a.iter().fold(BigInt::zero(), |g, x| g.gcd(&scaled(x)));
    let rhs = scaled(b);
    if gcd.is_zero() {
        rhs.is_zero()
    } else {
        rhs.is_multiple_of(&gcd)
    }
}

/// Converts an exact coordinate back to floating point.
pub fn to_value(x: &Rational) -> Value {
    match (x.numer().to_f64(), x.denom().to_f64()) {
        (Some(n), Some(d)) => n / d,
        _ => Value::NAN,
    }
}
