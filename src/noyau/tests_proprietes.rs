//! Tests de propriétés : échantillons déterministes (LCG) sur tout le noyau.
//!
//! - racines reportées dans le polynôme (résidu relatif)
//! - redimensionnement aller-retour
//! - (A×B)ᵗ = Bᵗ×Aᵗ, A×A⁻¹ = I
//! - évaluation : exemples de référence, modes d’angle
//! - historique FIFO

use approx::{assert_abs_diff_eq, assert_relative_eq};
use num_complex::Complex64;

use super::equations::{resoudre, Solution, TypeEquation};
use super::erreurs::{ErreurEquation, ErreurEval, ErreurMatrice};
use super::eval::{eval_dans_session, eval_expression};
use super::matrices::{determinant, inverse, MagasinMatrices, Matrice, NomMatrice};
use super::session::{Session, HISTORIQUE_MAX};
use super::trig::ModeAngle;

/* ------------------------ RNG déterministe minimal ------------------------ */

struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    /// Entier dans [min, max].
    fn entier(&mut self, min: i32, max: i32) -> i32 {
        min + (self.next_u32() % (max - min + 1) as u32) as i32
    }
    /// Réel dans [-amp, amp].
    fn reel(&mut self, amp: f64) -> f64 {
        (f64::from(self.next_u32()) / f64::from(u32::MAX) * 2.0 - 1.0) * amp
    }
    /// ±m·10^k, |m| dans ]1e-3, 10], k dans [-exp, exp].
    fn etendu(&mut self, exp: i32) -> f64 {
        self.non_nul(10.0) * 10f64.powi(self.entier(-exp, exp))
    }
    fn non_nul(&mut self, amp: f64) -> f64 {
        loop {
            let x = self.reel(amp);
            if x.abs() > 1e-3 {
                return x;
            }
        }
    }
}

/* ------------------------ Outils ------------------------ */

fn racines(s: Solution) -> Vec<Complex64> {
    match s {
        Solution::Racines(r) => r,
        Solution::RacineDouble(x) => vec![Complex64::new(x, 0.0)],
        autre => panic!("attendu des racines, obtenu {autre:?}"),
    }
}

/// |P(z)| rapporté à la somme des |termes| (résidu relatif).
/// Pour |z| > 1, on évalue P(z)/zⁿ (polynôme retourné en 1/z) : même rapport, sans débordement.
fn residu(poly: &[f64], z: Complex64) -> f64 {
    if z.norm() > 1.0 {
        let retourne: Vec<f64> = poly.iter().rev().copied().collect();
        let n = z.norm();
        return residu_direct(&retourne, z.conj() / n / n);
    }
    residu_direct(poly, z)
}

fn residu_direct(poly: &[f64], z: Complex64) -> f64 {
    let n = poly.len() - 1;
    let mut val = Complex64::new(0.0, 0.0);
    let mut echelle = 0.0;
    for (k, c) in poly.iter().enumerate() {
        let terme = z.powu((n - k) as u32) * *c;
        val += terme;
        echelle += terme.norm();
    }
    if echelle == 0.0 {
        val.norm()
    } else {
        val.norm() / echelle
    }
}

fn matrice_aleatoire(rng: &mut Rng, l: usize, c: usize) -> Matrice {
    let mut m = Matrice::zeros(l, c);
    for i in 0..l {
        for j in 0..c {
            m.set(i, j, rng.reel(10.0));
        }
    }
    m
}

fn assert_matrices_proches(a: &Matrice, b: &Matrice, eps: f64) {
    assert_eq!(a.dimension(), b.dimension());
    for i in 0..a.lignes() {
        for j in 0..a.colonnes() {
            assert_abs_diff_eq!(a.get(i, j), b.get(i, j), epsilon = eps);
        }
    }
}

/* ------------------------ Équations ------------------------ */

#[test]
fn lineaire_x_egal_moins_b_sur_a() {
    let mut rng = Rng::new(1);
    for _ in 0..500 {
        let a = rng.non_nul(1e3);
        let b = rng.reel(1e3);
        let x = racines(resoudre(TypeEquation::Lineaire, &[a, b]).unwrap())[0].re;
        assert_eq!(x, -b / a);
        assert!((a * x + b).abs() <= 1e-12 * b.abs().max(1.0));
    }
}

#[test]
fn quadratique_branches_construites() {
    let mut rng = Rng::new(2);
    for _ in 0..300 {
        let a = f64::from(rng.entier(1, 9)) * if rng.entier(0, 1) == 0 { 1.0 } else { -1.0 };

        // D > 0 : deux racines entières distinctes
        let r1 = f64::from(rng.entier(-20, 20));
        let r2 = r1 + f64::from(rng.entier(1, 15));
        let poly = [a, -a * (r1 + r2), a * r1 * r2];
        let z = racines(resoudre(TypeEquation::Quadratique, &poly).unwrap());
        assert_eq!(z.len(), 2);
        assert_relative_eq!(z[0].re, r2, epsilon = 1e-9, max_relative = 1e-9);
        assert_relative_eq!(z[1].re, r1, epsilon = 1e-9, max_relative = 1e-9);

        // D = 0
        let r = f64::from(rng.entier(-20, 20));
        let poly = [a, -2.0 * a * r, a * r * r];
        assert_eq!(
            resoudre(TypeEquation::Quadratique, &poly).unwrap(),
            Solution::RacineDouble(r)
        );

        // D < 0 : paire conjuguée
        let re = f64::from(rng.entier(-10, 10));
        let im = f64::from(rng.entier(1, 10));
        let poly = [a, -2.0 * a * re, a * (re * re + im * im)];
        let z = racines(resoudre(TypeEquation::Quadratique, &poly).unwrap());
        assert_relative_eq!(z[0].re, re, epsilon = 1e-9);
        assert_relative_eq!(z[0].im, im, max_relative = 1e-9);
        assert_eq!(z[1], z[0].conj());
    }
}

#[test]
fn quadratique_residu_coefficients_quelconques() {
    let mut rng = Rng::new(3);
    for _ in 0..1000 {
        let poly = [rng.non_nul(100.0), rng.reel(100.0), rng.reel(100.0)];
        for z in racines(resoudre(TypeEquation::Quadratique, &poly).unwrap()) {
            assert!(residu(&poly, z) < 1e-9, "poly={poly:?} z={z}");
        }
    }
}

#[test]
fn quadratique_ordres_de_grandeur_extremes() {
    let mut rng = Rng::new(5);
    let mut non_finies = 0usize;
    for _ in 0..2000 {
        let poly = [rng.etendu(150), rng.etendu(150), rng.etendu(150)];
        match resoudre(TypeEquation::Quadratique, &poly) {
            Ok(sol) => {
                let double = matches!(sol, Solution::RacineDouble(_));
                for z in racines(sol) {
                    assert!(z.re.is_finite() && z.im.is_finite(), "poly={poly:?} z={z}");
                    assert!(
                        residu(&poly, z) < 1e-9,
                        "poly={poly:?} z={z} racine double={double}"
                    );
                }
            }
            Err(ErreurEquation::NonFini) => non_finies += 1,
            Err(e) => panic!("poly={poly:?} erreur inattendue: {e}"),
        }
    }
    assert!(non_finies < 2000);
}

#[test]
fn cubique_ordres_de_grandeur_extremes() {
    let mut rng = Rng::new(6);
    for _ in 0..2000 {
        let poly = [rng.etendu(150), rng.etendu(150), rng.etendu(150), rng.etendu(150)];
        match resoudre(TypeEquation::Cubique, &poly) {
            Ok(sol) => {
                let z = racines(sol);
                assert_eq!(z.len(), 3, "poly={poly:?}");
                assert!(z.iter().all(|r| r.re.is_finite() && r.im.is_finite()));
            }
            Err(e) => assert_eq!(e, ErreurEquation::NonFini, "poly={poly:?}"),
        }
    }
}

#[test]
fn cubique_trois_racines_au_residu_faible() {
    let mut rng = Rng::new(4);
    for _ in 0..1000 {
        let poly = [rng.non_nul(50.0), rng.reel(50.0), rng.reel(50.0), rng.reel(50.0)];
        let z = racines(resoudre(TypeEquation::Cubique, &poly).unwrap());
        assert_eq!(z.len(), 3);
        for r in &z {
            assert!(residu(&poly, *r) < 1e-8, "poly={poly:?} z={r}");
        }
        // paires conjuguées ensemble
        let complexes: Vec<&Complex64> = z.iter().filter(|r| r.im != 0.0).collect();
        assert!(complexes.is_empty() || complexes.len() == 2);
    }
}

#[test]
fn systemes_reconstruits() {
    let mut rng = Rng::new(5);
    for _ in 0..200 {
        // diagonale dominante : bien conditionné
        let n = if rng.entier(0, 1) == 0 { 2 } else { 3 };
        let mut a = matrice_aleatoire(&mut rng, n, n);
        for k in 0..n {
            a.set(k, k, a.get(k, k) + 40.0);
        }
        let x: Vec<f64> = (0..n).map(|_| rng.reel(10.0)).collect();

        let mut coefs = Vec::new();
        for i in 0..n {
            let mut rhs = 0.0;
            for j in 0..n {
                coefs.push(a.get(i, j));
                rhs += a.get(i, j) * x[j];
            }
            coefs.push(rhs);
        }

        let kind = if n == 2 { TypeEquation::Systeme2 } else { TypeEquation::Systeme3 };
        match resoudre(kind, &coefs).unwrap() {
            Solution::Systeme(v) => {
                for (vi, xi) in v.iter().zip(&x) {
                    assert_abs_diff_eq!(*vi, *xi, epsilon = 1e-9);
                }
            }
            autre => panic!("{autre:?}"),
        }
    }
}

/* ------------------------ Matrices ------------------------ */

#[test]
fn redimensionnement_aller_retour() {
    let mut rng = Rng::new(6);
    for _ in 0..100 {
        let mut s = MagasinMatrices::default();
        let nom = NomMatrice::A;
        s.redimensionner(nom, 2, 2).unwrap();
        for i in 0..2 {
            for j in 0..2 {
                s.set(nom, i, j, rng.reel(1e6)).unwrap();
            }
        }
        let avant = s.matrice(nom).clone();

        let l = rng.entier(2, 4) as usize;
        let c = rng.entier(2, 4) as usize;
        s.redimensionner(nom, l, c).unwrap();
        s.redimensionner(nom, 2, 2).unwrap();
        assert_eq!(s.matrice(nom), &avant);
    }
}

#[test]
fn transposee_du_produit() {
    let mut rng = Rng::new(7);
    for _ in 0..200 {
        let l = rng.entier(1, 4) as usize;
        let k = rng.entier(1, 4) as usize;
        let c = rng.entier(1, 4) as usize;
        let a = matrice_aleatoire(&mut rng, l, k);
        let b = matrice_aleatoire(&mut rng, k, c);

        let gauche = a.produit(&b).unwrap().transposee();
        let droite = b.transposee().produit(&a.transposee()).unwrap();
        assert_matrices_proches(&gauche, &droite, 1e-9);
    }
}

#[test]
fn inverse_fois_matrice() {
    let mut rng = Rng::new(8);
    for _ in 0..200 {
        let n = rng.entier(1, 4) as usize;
        let mut a = matrice_aleatoire(&mut rng, n, n);
        for k in 0..n {
            a.set(k, k, a.get(k, k) + 50.0);
        }
        let inv = inverse(&a, 'A').unwrap();
        assert_matrices_proches(&a.produit(&inv).unwrap(), &Matrice::identite(n), 1e-9);
    }
}

#[test]
fn singuliere_2x2() {
    let a = Matrice::depuis_lignes(&[vec![1.0, 2.0], vec![2.0, 4.0]]);
    assert_abs_diff_eq!(determinant(&a, 'A').unwrap(), 0.0, epsilon = 1e-12);
    assert_eq!(inverse(&a, 'A'), Err(ErreurMatrice::Singuliere));

    // lignes proportionnelles quelconques
    let mut rng = Rng::new(9);
    for _ in 0..100 {
        let (x, y, k) = (rng.non_nul(10.0), rng.non_nul(10.0), rng.non_nul(10.0));
        let a = Matrice::depuis_lignes(&[vec![x, y], vec![k * x, k * y]]);
        assert_eq!(inverse(&a, 'A'), Err(ErreurMatrice::Singuliere));
    }
}

/* ------------------------ Évaluation ------------------------ */

#[test]
fn exemples_de_reference() {
    let zero = Complex64::new(0.0, 0.0);
    let mut s = Session::default();
    assert_eq!(
        eval_dans_session(&mut s, "2×3+4", ModeAngle::Deg, 10).unwrap().1,
        "10"
    );
    assert_eq!(
        eval_expression("1÷0", ModeAngle::Deg, zero),
        Err(ErreurEval::DivisionParZero)
    );
    assert_eq!(
        eval_dans_session(&mut s, "sin(90)", ModeAngle::Deg, 10).unwrap().1,
        "1"
    );
    let z = eval_expression("sin(90)", ModeAngle::Rad, zero).unwrap();
    assert_relative_eq!(z.re, 90f64.sin(), max_relative = 1e-12);
}

#[test]
fn trig_coherente_entre_modes() {
    let mut rng = Rng::new(10);
    let zero = Complex64::new(0.0, 0.0);
    for _ in 0..300 {
        let deg = rng.reel(720.0);
        let rad = deg.to_radians();
        let grad = deg / 0.9;
        for f in ["sin", "cos"] {
            let d = eval_expression(&format!("{f}({deg})"), ModeAngle::Deg, zero).unwrap();
            let r = eval_expression(&format!("{f}({rad})"), ModeAngle::Rad, zero).unwrap();
            let g = eval_expression(&format!("{f}({grad})"), ModeAngle::Grad, zero).unwrap();
            assert_abs_diff_eq!(d.re, r.re, epsilon = 1e-9);
            assert_abs_diff_eq!(g.re, r.re, epsilon = 1e-9);
        }
    }
}

#[test]
fn historique_fifo_et_clear() {
    let mut s = Session::default();
    for k in 0..(HISTORIQUE_MAX + 5) {
        eval_dans_session(&mut s, &format!("{k}+0"), ModeAngle::Deg, 10).unwrap();
    }
    let premiers: Vec<String> = s
        .historique()
        .entrees()
        .take(2)
        .map(|e| e.expression.clone())
        .collect();
    assert_eq!(premiers, vec!["5+0", "6+0"]);
    assert_eq!(s.historique().len(), HISTORIQUE_MAX);
    s.vider_historique();
    assert_eq!(s.historique().entrees().count(), 0);
}
