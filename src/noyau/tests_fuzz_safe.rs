//! Tests fuzz safe : robustesse + déterminisme + limites contrôlées.
//!
//! But : marteler le pipeline sans brûler la machine.
//! - RNG déterministe (seed fixe)
//! - profondeur bornée
//! - budget temps global
//! - aucune panique, quelle que soit l’entrée (texte aléatoire compris)
//! - invariant clé : un échec ne touche ni Ans ni l’historique

use std::time::{Duration, Instant};

use num_complex::Complex64;

use super::equations::{resoudre_dans_session, TypeEquation};
use super::erreurs::ErreurEval;
use super::eval::{eval_dans_session, eval_expression};
use super::matrices::{MagasinMatrices, NomMatrice, OperationMatrice};
use super::session::{Session, HISTORIQUE_MAX};
use super::trig::ModeAngle;

/* ------------------------ RNG déterministe minimal ------------------------ */

#[derive(Clone)]
struct Rng {
    state: u64,
}
impl Rng {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }
    fn next_u32(&mut self) -> u32 {
        // LCG simple (déterministe)
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (self.state >> 32) as u32
    }
    fn pick(&mut self, n: u32) -> u32 {
        if n == 0 {
            0
        } else {
            self.next_u32() % n
        }
    }
    fn choisir<'a>(&mut self, items: &[&'a str]) -> &'a str {
        items[self.pick(items.len() as u32) as usize]
    }
}

/* ------------------------ Budget anti-gel ------------------------ */

fn budget(start: Instant, max: Duration) {
    if start.elapsed() > max {
        panic!("budget temps dépassé: {:?}", max);
    }
}

/* ------------------------ Génération d’expressions (bornée) ------------------------ */

const ATOMES: &[&str] = &[
    "0", "1", "2", "3", "7", "0.5", "2.5e3", "1e-5", "90", "180", "pi", "π", "e", "i", "Ans",
];

const FONCTIONS_1: &[&str] = &[
    "sin", "cos", "tan", "asin", "acos", "atan", "sinh", "acosh", "atanh", "ln", "log",
    "log2", "sqrt", "√", "exp", "abs", "arg", "conj", "floor", "ceil",
];

const FONCTIONS_2: &[&str] = &["npr", "ncr", "gcd", "lcm", "pol", "rec", "logb"];

const OPERATEURS: &[&str] = &["+", "-", "×", "÷", "*", "/", "^", "%"];

fn gen_expr(rng: &mut Rng, depth: usize) -> String {
    if depth == 0 {
        return rng.choisir(ATOMES).to_string();
    }

    match rng.pick(7) {
        0 => rng.choisir(ATOMES).to_string(),
        1 | 2 => format!(
            "({}{}{})",
            gen_expr(rng, depth - 1),
            rng.choisir(OPERATEURS),
            gen_expr(rng, depth - 1)
        ),
        3 => format!("{}({})", rng.choisir(FONCTIONS_1), gen_expr(rng, depth - 1)),
        4 => format!(
            "{}({},{})",
            rng.choisir(FONCTIONS_2),
            gen_expr(rng, depth - 1),
            gen_expr(rng, depth - 1)
        ),
        5 => format!("-{}", gen_expr(rng, depth - 1)),
        _ => format!("({})!", rng.choisir(&["0", "3", "5", "2.5", "-1"])),
    }
}

/// Bruit : suites arbitraires de caractères plausibles (et moins plausibles).
fn gen_bruit(rng: &mut Rng) -> String {
    const ALPHABET: &[&str] = &[
        "(", ")", "+", "-", "−", "×", "÷", "^", "!", ",", ".", "1", "9", "e", "E", "x", "sin",
        "Ans", "π", "√", " ", "%", "**", "ë", "$", "=",
    ];
    let n = 1 + rng.pick(24) as usize;
    (0..n).map(|_| rng.choisir(ALPHABET)).collect()
}

/* ------------------------ Helper somme balancée anti pile ------------------------ */

fn somme_balancee(terme: &str, n: usize) -> String {
    let mut items: Vec<String> = (0..n).map(|_| terme.to_string()).collect();
    while items.len() > 1 {
        let mut next = Vec::new();
        let mut i = 0;
        while i < items.len() {
            if i + 1 < items.len() {
                next.push(format!("({}+{})", items[i], items[i + 1]));
                i += 2;
            } else {
                next.push(items[i].clone());
                i += 1;
            }
        }
        items = next;
    }
    items.pop().unwrap_or_else(|| "0".to_string())
}

/* ------------------------ Tests ------------------------ */

#[test]
fn fuzz_safe_session_intacte_sur_echec() {
    let t0 = Instant::now();
    let max = Duration::from_secs(3);

    let mut rng = Rng::new(0xC0FFEE_u64);
    let mut session = Session::default();

    let mut seen_ok = 0usize;
    let mut seen_err = 0usize;

    for k in 0..300 {
        budget(t0, max);

        let expr = gen_expr(&mut rng, 4);
        let mode = [ModeAngle::Deg, ModeAngle::Rad, ModeAngle::Grad][k % 3];

        let ans_avant = session.ans();
        let n_avant = session.historique().len();

        match eval_dans_session(&mut session, &expr, mode, 10) {
            Ok((z, texte)) => {
                assert!(z.re.is_finite() && z.im.is_finite(), "expr={expr:?}");
                assert_eq!(session.ans(), z);
                let e = session.historique().entrees().last().unwrap();
                assert_eq!(e.resultat, texte);
                assert_eq!(session.historique().len(), (n_avant + 1).min(HISTORIQUE_MAX));
                seen_ok += 1;
            }
            Err(_) => {
                assert_eq!(session.ans(), ans_avant, "Ans modifié par un échec: {expr:?}");
                assert_eq!(session.historique().len(), n_avant);
                seen_err += 1;
            }
        }
    }

    // On veut voir un mix des deux, sinon le fuzz ne “balaye” rien.
    assert!(seen_ok > 20, "trop peu de succès: {seen_ok}");
    assert!(seen_err > 0, "aucune erreur vue: fuzz trop “sage”");
}

#[test]
fn fuzz_safe_bruit_sans_panique() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0xBADC0DE_u64);

    for _ in 0..500 {
        budget(t0, max);

        let texte = gen_bruit(&mut rng);
        if let Ok(z) = eval_expression(&texte, ModeAngle::Deg, Complex64::new(1.0, 0.0)) {
            assert!(z.re.is_finite() && z.im.is_finite(), "texte={texte:?}");
        }
    }
}

#[test]
fn fuzz_safe_somme_balancee_anti_pile() {
    let t0 = Instant::now();
    let max = Duration::from_secs(1);

    let expr = somme_balancee("1/2", 800);
    let z = eval_expression(&expr, ModeAngle::Deg, Complex64::new(0.0, 0.0))
        .unwrap_or_else(|e| panic!("err: {e}"));
    budget(t0, max);

    // 800*(1/2) = 400
    assert_eq!(z, Complex64::new(400.0, 0.0));
}

#[test]
fn fuzz_safe_imbrication_profonde_refusee() {
    // chaîne de négations : l’AST serait plus profond que la borne
    let expr = format!("{}1", "-".repeat(5000));
    assert!(matches!(
        eval_expression(&expr, ModeAngle::Rad, Complex64::new(0.0, 0.0)),
        Err(ErreurEval::Syntaxe(_))
    ));

    // parenthèses seules : aucune profondeur d’AST, accepté
    let expr = format!("{}2{}", "(".repeat(3000), ")".repeat(3000));
    assert_eq!(
        eval_expression(&expr, ModeAngle::Rad, Complex64::new(0.0, 0.0)),
        Ok(Complex64::new(2.0, 0.0))
    );
}

#[test]
fn fuzz_safe_equations_et_matrices() {
    let t0 = Instant::now();
    let max = Duration::from_secs(2);

    let mut rng = Rng::new(0x5EED_u64);
    let mut session = Session::default();
    let champs_possibles = ["", "0", "1", "-1", "2.5", "−3", "1e300", "abc", "1e-300", "7"];

    for _ in 0..200 {
        budget(t0, max);

        let kind = TypeEquation::TOUS[rng.pick(5) as usize];
        let champs: Vec<&str> = (0..kind.nb_coefficients())
            .map(|_| rng.choisir(&champs_possibles))
            .collect();

        let n_avant = session.historique().len();
        match resoudre_dans_session(&mut session, kind, &champs, 6) {
            Ok(_) => assert_eq!(
                session.historique().len(),
                (n_avant + 1).min(HISTORIQUE_MAX)
            ),
            Err(_) => assert_eq!(session.historique().len(), n_avant),
        }
        assert_eq!(session.ans(), Complex64::new(0.0, 0.0));
    }

    let mut magasin = MagasinMatrices::default();
    for _ in 0..200 {
        budget(t0, max);

        let nom = NomMatrice::TOUS[rng.pick(3) as usize];
        let l = 1 + rng.pick(4) as usize;
        let c = 1 + rng.pick(4) as usize;
        magasin.redimensionner(nom, l, c).unwrap();
        for i in 0..l {
            for j in 0..c {
                let v = f64::from(rng.pick(7)) - 3.0;
                magasin.set(nom, i, j, v).unwrap();
            }
        }

        let autre = NomMatrice::TOUS[rng.pick(3) as usize];
        for op in [
            OperationMatrice::Determinant(nom),
            OperationMatrice::Inverse(nom),
            OperationMatrice::Transposee(nom),
            OperationMatrice::Produit(nom, autre),
            OperationMatrice::Resoudre(nom),
        ] {
            // Ok ou Err structuré : jamais de panique
            let _ = magasin.executer(op);
        }
    }
}
