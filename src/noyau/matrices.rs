// src/noyau/matrices.rs
//
// Matrices nommées A, B, C (1×1 à 4×4) + moteur d’algèbre dense.
// - Stockage ligne par ligne, toujours aligné sur la dimension déclarée.
// - Redimensionnement : valeurs communes conservées, le reste à 0
//   (ce qui sort lors d’une réduction est perdu).
// - Accès hors bornes = erreur de programmation : panique immédiate.
// - Singularité : pivot comparé à une tolérance relative à la norme, jamais à 0 exact.

use std::fmt;
use std::str::FromStr;

use super::erreurs::ErreurMatrice;

/// Dimension maximale (lignes et colonnes).
pub const DIM_MAX: usize = 4;

/// Tolérance relative de singularité (× norme max × n).
const TOL_SINGULIER: f64 = 1e-12;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NomMatrice {
    A,
    B,
    C,
}

impl NomMatrice {
    pub const TOUS: [NomMatrice; 3] = [NomMatrice::A, NomMatrice::B, NomMatrice::C];

    pub fn lettre(self) -> char {
        match self {
            NomMatrice::A => 'A',
            NomMatrice::B => 'B',
            NomMatrice::C => 'C',
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

impl fmt::Display for NomMatrice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lettre())
    }
}

impl FromStr for NomMatrice {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Ok(NomMatrice::A),
            "B" => Ok(NomMatrice::B),
            "C" => Ok(NomMatrice::C),
            autre => Err(format!("matrice inconnue : {autre}")),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Matrice {
    lignes: usize,
    colonnes: usize,
    donnees: Vec<f64>,
}

impl Matrice {
    pub fn zeros(lignes: usize, colonnes: usize) -> Self {
        Self {
            lignes,
            colonnes,
            donnees: vec![0.0; lignes * colonnes],
        }
    }

    pub fn identite(n: usize) -> Self {
        let mut m = Self::zeros(n, n);
        for k in 0..n {
            m.set(k, k, 1.0);
        }
        m
    }

    /// Construit depuis des lignes de même longueur (panique sinon).
    pub fn depuis_lignes(lignes: &[Vec<f64>]) -> Self {
        let colonnes = lignes.first().map_or(0, |l| l.len());
        assert!(
            lignes.iter().all(|l| l.len() == colonnes),
            "lignes de longueurs différentes"
        );
        Self {
            lignes: lignes.len(),
            colonnes,
            donnees: lignes.iter().flatten().copied().collect(),
        }
    }

    pub fn lignes(&self) -> usize {
        self.lignes
    }

    pub fn colonnes(&self) -> usize {
        self.colonnes
    }

    pub fn dimension(&self) -> (usize, usize) {
        (self.lignes, self.colonnes)
    }

    pub fn est_carree(&self) -> bool {
        self.lignes == self.colonnes
    }

    pub fn get(&self, i: usize, j: usize) -> f64 {
        assert!(
            i < self.lignes && j < self.colonnes,
            "accès ({i},{j}) hors d’une matrice {}×{}",
            self.lignes,
            self.colonnes
        );
        self.donnees[i * self.colonnes + j]
    }

    pub fn set(&mut self, i: usize, j: usize, v: f64) {
        assert!(
            i < self.lignes && j < self.colonnes,
            "accès ({i},{j}) hors d’une matrice {}×{}",
            self.lignes,
            self.colonnes
        );
        self.donnees[i * self.colonnes + j] = v;
    }

    pub fn vers_lignes(&self) -> Vec<Vec<f64>> {
        self.donnees
            .chunks(self.colonnes.max(1))
            .take(self.lignes)
            .map(|c| c.to_vec())
            .collect()
    }

    /// Nouvelle forme : recouvrement conservé, reste à 0.
    pub fn redimensionner(&mut self, lignes: usize, colonnes: usize) {
        if (lignes, colonnes) == self.dimension() {
            return;
        }
        let mut m = Matrice::zeros(lignes, colonnes);
        for i in 0..lignes.min(self.lignes) {
            for j in 0..colonnes.min(self.colonnes) {
                m.set(i, j, self.get(i, j));
            }
        }
        *self = m;
    }

    pub fn transposee(&self) -> Matrice {
        let mut t = Matrice::zeros(self.colonnes, self.lignes);
        for i in 0..self.lignes {
            for j in 0..self.colonnes {
                t.set(j, i, self.get(i, j));
            }
        }
        t
    }

    pub fn produit(&self, autre: &Matrice) -> Result<Matrice, ErreurMatrice> {
        if self.colonnes != autre.lignes {
            return Err(ErreurMatrice::DimensionsIncompatibles(format!(
                "{}×{} par {}×{}",
                self.lignes, self.colonnes, autre.lignes, autre.colonnes
            )));
        }
        let mut p = Matrice::zeros(self.lignes, autre.colonnes);
        for i in 0..self.lignes {
            for j in 0..autre.colonnes {
                let s: f64 = (0..self.colonnes)
                    .map(|k| self.get(i, k) * autre.get(k, j))
                    .sum();
                p.set(i, j, s);
            }
        }
        Ok(p)
    }

    fn norme_max(&self) -> f64 {
        self.donnees.iter().fold(0.0, |m, v| m.max(v.abs()))
    }

    fn tolerance(&self) -> f64 {
        TOL_SINGULIER * self.norme_max() * self.lignes.max(self.colonnes) as f64
    }

    fn echanger_lignes(&mut self, a: usize, b: usize) {
        if a == b {
            return;
        }
        for j in 0..self.colonnes {
            self.donnees.swap(a * self.colonnes + j, b * self.colonnes + j);
        }
    }

    /// Ligne du plus grand pivot (en valeur absolue) dans la colonne `col`, à partir de `depuis`.
    fn ligne_pivot(&self, col: usize, depuis: usize) -> usize {
        (depuis..self.lignes)
            .max_by(|&a, &b| self.get(a, col).abs().total_cmp(&self.get(b, col).abs()))
            .unwrap_or(depuis)
    }
}

/* ------------------------ Moteur ------------------------ */

fn exiger_carree(m: &Matrice, nom: char) -> Result<usize, ErreurMatrice> {
    if !m.est_carree() {
        return Err(ErreurMatrice::NonCarree(nom));
    }
    Ok(m.lignes())
}

/// Déterminant par élimination de Gauss (pivot partiel).
/// Pivot sous la tolérance => 0 exactement.
pub fn determinant(m: &Matrice, nom: char) -> Result<f64, ErreurMatrice> {
    let n = exiger_carree(m, nom)?;
    let tol = m.tolerance();
    let mut a = m.clone();
    let mut det = 1.0;

    for col in 0..n {
        let p = a.ligne_pivot(col, col);
        let pivot = a.get(p, col);
        if pivot.abs() <= tol {
            return Ok(0.0);
        }
        if p != col {
            a.echanger_lignes(p, col);
            det = -det;
        }
        det *= pivot;
        for i in (col + 1)..n {
            let f = a.get(i, col) / pivot;
            for j in col..n {
                let v = a.get(i, j) - f * a.get(col, j);
                a.set(i, j, v);
            }
        }
    }
    Ok(det)
}

/// Résout A·X = B (B à une ou plusieurs colonnes) par Gauss-Jordan avec pivot partiel.
pub fn resoudre(a: &Matrice, b: &Matrice, nom: char) -> Result<Matrice, ErreurMatrice> {
    let n = exiger_carree(a, nom)?;
    if b.lignes() != n {
        return Err(ErreurMatrice::DimensionsIncompatibles(format!(
            "second membre {}×{} pour une matrice {n}×{n}",
            b.lignes(),
            b.colonnes()
        )));
    }

    let tol = a.tolerance();
    let mut a = a.clone();
    let mut x = b.clone();
    let m = x.colonnes();

    for col in 0..n {
        let p = a.ligne_pivot(col, col);
        if a.get(p, col).abs() <= tol {
            return Err(ErreurMatrice::Singuliere);
        }
        a.echanger_lignes(p, col);
        x.echanger_lignes(p, col);

        let pivot = a.get(col, col);
        for j in 0..n {
            a.set(col, j, a.get(col, j) / pivot);
        }
        for j in 0..m {
            x.set(col, j, x.get(col, j) / pivot);
        }

        for i in 0..n {
            if i == col {
                continue;
            }
            let f = a.get(i, col);
            if f == 0.0 {
                continue;
            }
            for j in 0..n {
                a.set(i, j, a.get(i, j) - f * a.get(col, j));
            }
            for j in 0..m {
                x.set(i, j, x.get(i, j) - f * x.get(col, j));
            }
        }
    }
    Ok(x)
}

pub fn inverse(m: &Matrice, nom: char) -> Result<Matrice, ErreurMatrice> {
    let n = exiger_carree(m, nom)?;
    resoudre(m, &Matrice::identite(n), nom)
}

/// Rang numérique (échelonnement avec tolérance relative).
pub fn rang(m: &Matrice) -> usize {
    let tol = m.tolerance();
    let mut a = m.clone();
    let mut r = 0;

    for col in 0..a.colonnes() {
        if r == a.lignes() {
            break;
        }
        let p = a.ligne_pivot(col, r);
        let pivot = a.get(p, col);
        if pivot.abs() <= tol {
            continue;
        }
        a.echanger_lignes(p, r);
        for i in (r + 1)..a.lignes() {
            let f = a.get(i, col) / pivot;
            for j in col..a.colonnes() {
                let v = a.get(i, j) - f * a.get(r, j);
                a.set(i, j, v);
            }
        }
        r += 1;
    }
    r
}

/* ------------------------ Magasin A/B/C ------------------------ */

/// Les trois matrices nommées (2×2 nulles au départ).
#[derive(Clone, Debug)]
pub struct MagasinMatrices {
    slots: [Matrice; 3],
}

impl Default for MagasinMatrices {
    fn default() -> Self {
        Self {
            slots: [Matrice::zeros(2, 2), Matrice::zeros(2, 2), Matrice::zeros(2, 2)],
        }
    }
}

impl MagasinMatrices {
    pub fn matrice(&self, nom: NomMatrice) -> &Matrice {
        &self.slots[nom.index()]
    }

    pub fn redimensionner(
        &mut self,
        nom: NomMatrice,
        lignes: usize,
        colonnes: usize,
    ) -> Result<(), ErreurMatrice> {
        if !(1..=DIM_MAX).contains(&lignes) || !(1..=DIM_MAX).contains(&colonnes) {
            return Err(ErreurMatrice::DimensionInvalide { lignes, colonnes });
        }
        self.slots[nom.index()].redimensionner(lignes, colonnes);
        Ok(())
    }

    pub fn get(&self, nom: NomMatrice, i: usize, j: usize) -> f64 {
        self.slots[nom.index()].get(i, j)
    }

    /// NaN et ±∞ refusés : la matrice reste inchangée.
    pub fn set(
        &mut self,
        nom: NomMatrice,
        i: usize,
        j: usize,
        v: f64,
    ) -> Result<(), ErreurMatrice> {
        if !v.is_finite() {
            return Err(ErreurMatrice::ValeurNonFinie(nom.lettre()));
        }
        self.slots[nom.index()].set(i, j, v);
        Ok(())
    }

    /// Remplit une matrice ligne par ligne (dimension ajustée d’abord). Tout ou rien.
    pub fn remplir(&mut self, nom: NomMatrice, lignes: &[Vec<f64>]) -> Result<(), ErreurMatrice> {
        if lignes.iter().flatten().any(|v| !v.is_finite()) {
            return Err(ErreurMatrice::ValeurNonFinie(nom.lettre()));
        }
        let l = lignes.len();
        let c = lignes.first().map_or(0, |r| r.len());
        if lignes.iter().any(|r| r.len() != c) {
            return Err(ErreurMatrice::DimensionsIncompatibles(
                "lignes de longueurs différentes".into(),
            ));
        }
        self.redimensionner(nom, l, c)?;
        for (i, ligne) in lignes.iter().enumerate() {
            for (j, v) in ligne.iter().enumerate() {
                self.slots[nom.index()].set(i, j, *v);
            }
        }
        Ok(())
    }

    pub fn executer(&self, op: OperationMatrice) -> Result<ResultatMatrice, ErreurMatrice> {
        op.executer(self)
    }
}

/// Opérations disponibles (enum fermé -> handler).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationMatrice {
    Determinant(NomMatrice),
    Inverse(NomMatrice),
    Transposee(NomMatrice),
    Produit(NomMatrice, NomMatrice),
    /// nom·X = B
    Resoudre(NomMatrice),
}

#[derive(Clone, Debug, PartialEq)]
pub enum ResultatMatrice {
    Scalaire(f64),
    Matrice(Matrice),
}

impl OperationMatrice {
    pub fn executer(self, magasin: &MagasinMatrices) -> Result<ResultatMatrice, ErreurMatrice> {
        use OperationMatrice::*;
        match self {
            Determinant(n) => {
                determinant(magasin.matrice(n), n.lettre()).map(ResultatMatrice::Scalaire)
            }
            Inverse(n) => inverse(magasin.matrice(n), n.lettre()).map(ResultatMatrice::Matrice),
            Transposee(n) => Ok(ResultatMatrice::Matrice(magasin.matrice(n).transposee())),
            Produit(a, b) => magasin
                .matrice(a)
                .produit(magasin.matrice(b))
                .map(ResultatMatrice::Matrice),
            Resoudre(n) => resoudre(
                magasin.matrice(n),
                magasin.matrice(NomMatrice::B),
                n.lettre(),
            )
            .map(ResultatMatrice::Matrice),
        }
    }

    /// Libellé d’affichage / d’historique.
    pub fn libelle(self) -> String {
        use OperationMatrice::*;
        match self {
            Determinant(n) => format!("det({n})"),
            Inverse(n) => format!("{n}⁻¹"),
            Transposee(n) => format!("{n}ᵀ"),
            Produit(a, b) => format!("{a}×{b}"),
            Resoudre(n) => format!("{n}·X = B"),
        }
    }
}
