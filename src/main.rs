// src/main.rs
//
// Calculatrice scientifique : hôte ligne de commande
// ---------------------------------------------------
// But:
// - Tenir le rôle du shell : lire des lignes, les passer à la façade, afficher le texte rendu.
// - Une ligne sans ':' est une expression ; sinon une commande (voir AIDE).
//
// Journalisation sur stderr (RUST_LOG, défaut "warn") pour ne pas polluer les résultats.

use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use clap::Parser;
use thiserror::Error;
use tracing::error;
use tracing_subscriber::EnvFilter;

use calculatrice_sci::app::{AffichageOperation, Calculatrice, Reglages};
use calculatrice_sci::noyau::equations::TypeEquation;
use calculatrice_sci::noyau::format::{format_lignes, format_nombre};
use calculatrice_sci::noyau::matrices::{NomMatrice, OperationMatrice};
use calculatrice_sci::noyau::session::Registre;
use calculatrice_sci::noyau::trig::ModeAngle;

const AIDE: &str = "\
expression          évalue (ex: 2×3+4, sin(30), Ans^2)
:mode DEG|RAD|GRAD  mode d’angle
:fix n              décimales (0 à 15)
:eq type c1, c2…    lin | quad | cub | sys2 | sys3 (champ vide = 0)
:mat A 1 2; 3 4     remplit une matrice (A, B ou C)
:dim A l c          redimensionne (1 à 4)
:show A             affiche une matrice
:det A  :inv A  :trans A  :mul A B  :solve A   (second membre : B)
:sto R  :rcl R      Ans -> registre / lecture (A–F, M)
:m+  :m-  :mc       mémoire indépendante
:ans  :hist  :clear :aide  :q";

#[derive(Parser, Debug)]
#[command(name = "calculatrice_sci", version, about = "Calculatrice scientifique en ligne de commande")]
struct Args {
    /// Document de réglages JSON (angle_mode, decimal_places, history_enabled)
    #[arg(long)]
    reglages: Option<PathBuf>,

    /// Mode d’angle initial (prioritaire sur les réglages)
    #[arg(long)]
    mode: Option<ModeAngle>,

    /// Nombre de décimales (prioritaire sur les réglages)
    #[arg(long)]
    decimales: Option<usize>,
}

#[derive(Debug, Error)]
enum ErreurCommande {
    #[error("commande inconnue : {0} (:aide)")]
    Inconnue(String),

    #[error("argument manquant pour :{0}")]
    ArgumentManquant(&'static str),

    #[error("{0}")]
    Argument(String),
}

/// Commandes de l’hôte (enum fermé, un handler par variante).
#[derive(Debug)]
enum Commande {
    Evaluer(String),
    Mode(ModeAngle),
    Fix(usize),
    Equation(TypeEquation, Vec<String>),
    Remplir(NomMatrice, Vec<Vec<f64>>),
    Dimension(NomMatrice, usize, usize),
    Montrer(NomMatrice),
    Matrice(OperationMatrice),
    Stocker(Registre),
    Rappeler(Registre),
    MemoirePlus,
    MemoireMoins,
    MemoireEffacer,
    Ans,
    Historique,
    EffacerHistorique,
    Aide,
    Quitter,
}

fn argument<'a>(
    mots: &mut impl Iterator<Item = &'a str>,
    cmd: &'static str,
) -> Result<&'a str, ErreurCommande> {
    mots.next().ok_or(ErreurCommande::ArgumentManquant(cmd))
}

fn nombre<T: std::str::FromStr>(s: &str) -> Result<T, ErreurCommande> {
    s.parse()
        .map_err(|_| ErreurCommande::Argument(format!("nombre invalide : {s}")))
}

fn matrice(s: &str) -> Result<NomMatrice, ErreurCommande> {
    s.parse().map_err(ErreurCommande::Argument)
}

fn registre(s: &str) -> Result<Registre, ErreurCommande> {
    s.parse().map_err(ErreurCommande::Argument)
}

fn analyser(ligne: &str) -> Result<Commande, ErreurCommande> {
    let Some(reste) = ligne.strip_prefix(':') else {
        return Ok(Commande::Evaluer(ligne.to_string()));
    };

    let (nom, args) = reste.split_once(char::is_whitespace).unwrap_or((reste, ""));
    let mut mots = args.split_whitespace();

    let cmd = match nom.to_lowercase().as_str() {
        "mode" => Commande::Mode(argument(&mut mots, "mode")?.parse().map_err(ErreurCommande::Argument)?),
        "fix" => Commande::Fix(nombre(argument(&mut mots, "fix")?)?),
        "eq" => {
            let kind_txt = argument(&mut mots, "eq")?;
            let kind = TypeEquation::depuis_nom(kind_txt)
                .ok_or_else(|| ErreurCommande::Argument(format!("type d’équation inconnu : {kind_txt}")))?;
            let champs = args
                .trim_start()
                .strip_prefix(kind_txt)
                .unwrap_or("")
                .split(',')
                .map(|c| c.trim().to_string())
                .collect();
            Commande::Equation(kind, champs)
        }
        "mat" => {
            let nom = matrice(argument(&mut mots, "mat")?)?;
            let corps = args.trim_start().get(1..).unwrap_or("");
            let lignes = corps
                .split(';')
                .map(|l| {
                    l.split(|c: char| c.is_whitespace() || c == ',')
                        .filter(|v| !v.is_empty())
                        .map(|v| nombre::<f64>(&v.replace('−', "-")))
                        .collect::<Result<Vec<_>, _>>()
                })
                .collect::<Result<Vec<_>, _>>()?;
            Commande::Remplir(nom, lignes)
        }
        "dim" => {
            let nom = matrice(argument(&mut mots, "dim")?)?;
            let l = nombre(argument(&mut mots, "dim")?)?;
            let c = nombre(argument(&mut mots, "dim")?)?;
            Commande::Dimension(nom, l, c)
        }
        "show" => Commande::Montrer(matrice(argument(&mut mots, "show")?)?),
        "det" => Commande::Matrice(OperationMatrice::Determinant(matrice(argument(&mut mots, "det")?)?)),
        "inv" => Commande::Matrice(OperationMatrice::Inverse(matrice(argument(&mut mots, "inv")?)?)),
        "trans" => Commande::Matrice(OperationMatrice::Transposee(matrice(argument(&mut mots, "trans")?)?)),
        "mul" => {
            let a = matrice(argument(&mut mots, "mul")?)?;
            let b = matrice(argument(&mut mots, "mul")?)?;
            Commande::Matrice(OperationMatrice::Produit(a, b))
        }
        "solve" => Commande::Matrice(OperationMatrice::Resoudre(matrice(argument(&mut mots, "solve")?)?)),
        "sto" => Commande::Stocker(registre(argument(&mut mots, "sto")?)?),
        "rcl" => Commande::Rappeler(registre(argument(&mut mots, "rcl")?)?),
        "m+" => Commande::MemoirePlus,
        "m-" | "m−" => Commande::MemoireMoins,
        "mc" => Commande::MemoireEffacer,
        "ans" => Commande::Ans,
        "hist" => Commande::Historique,
        "clear" => Commande::EffacerHistorique,
        "aide" | "help" | "?" => Commande::Aide,
        "q" | "quit" => Commande::Quitter,
        autre => return Err(ErreurCommande::Inconnue(autre.to_string())),
    };
    Ok(cmd)
}

/// Exécute une commande ; renvoie les lignes à afficher.
fn executer(calc: &mut Calculatrice, cmd: Commande) -> Vec<String> {
    let d = calc.decimales();
    match cmd {
        Commande::Evaluer(texte) => {
            let a = calc.evaluer(&texte);
            match a.erreur {
                Some(msg) => vec![a.texte, format!("  ({msg})")],
                None => vec![a.texte],
            }
        }
        Commande::Mode(m) => {
            calc.set_mode(m);
            vec![format!("{} | FIX {}", calc.mode(), d)]
        }
        Commande::Fix(n) => {
            calc.set_decimales(n);
            vec![format!("{} | FIX {}", calc.mode(), calc.decimales())]
        }
        Commande::Equation(kind, champs) => {
            let champs: Vec<&str> = champs.iter().map(String::as_str).collect();
            let a = calc.resoudre(kind, &champs);
            match a.erreur {
                Some(msg) => vec![a.texte, format!("  ({msg})")],
                None => vec![a.texte],
            }
        }
        Commande::Remplir(nom, lignes) => match calc.remplir_matrice(nom, &lignes) {
            Ok(()) => format_lignes(&calc.matrices().matrice(nom).vers_lignes(), d),
            Err(e) => vec![format!("Error  ({e})")],
        },
        Commande::Dimension(nom, l, c) => match calc.redimensionner(nom, l, c) {
            Ok(()) => format_lignes(&calc.matrices().matrice(nom).vers_lignes(), d),
            Err(e) => vec![format!("Error  ({e})")],
        },
        Commande::Montrer(nom) => format_lignes(&calc.matrices().matrice(nom).vers_lignes(), d),
        Commande::Matrice(op) => match calc.operation_matrice(op) {
            AffichageOperation::Simple(a) => match a.erreur {
                Some(msg) => vec![format!("{} = {}  ({msg})", a.brut, a.texte)],
                None => vec![format!("{} = {}", a.brut, a.texte)],
            },
            AffichageOperation::Matrice(m) => {
                let mut out = vec![format!("{} =", m.titre)];
                out.extend(m.lignes);
                out
            }
        },
        Commande::Stocker(r) => {
            calc.stocker_ans(r);
            vec![format!("{} -> {r}", format_nombre(calc.ans(), d))]
        }
        Commande::Rappeler(r) => vec![format_nombre(calc.memoire(r), d)],
        Commande::MemoirePlus => {
            calc.memoire_plus();
            vec![format!("M = {}", format_nombre(calc.memoire(Registre::M), d))]
        }
        Commande::MemoireMoins => {
            calc.memoire_moins();
            vec![format!("M = {}", format_nombre(calc.memoire(Registre::M), d))]
        }
        Commande::MemoireEffacer => {
            calc.effacer_memoires();
            vec!["mémoires à 0".to_string()]
        }
        Commande::Ans => vec![format_nombre(calc.ans(), d)],
        Commande::Historique => calc
            .historique()
            .into_iter()
            .map(|e| format!("{} = {}", e.expression, e.resultat))
            .collect(),
        Commande::EffacerHistorique => {
            calc.clear_historique();
            vec!["historique vidé".to_string()]
        }
        Commande::Aide => AIDE.lines().map(str::to_string).collect(),
        Commande::Quitter => Vec::new(),
    }
}

fn main() -> io::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let args = Args::parse();

    let mut reglages = match &args.reglages {
        Some(chemin) => Reglages::charger(chemin).unwrap_or_else(|e| {
            error!(erreur = %e, "réglages ignorés");
            Reglages::default()
        }),
        None => Reglages::default(),
    };
    if let Some(m) = args.mode {
        reglages.angle_mode = m;
    }
    if let Some(n) = args.decimales {
        reglages.decimal_places = n;
    }

    let mut calc = Calculatrice::depuis_reglages(&reglages);

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    write!(stdout, "{} | FIX {}\n> ", calc.mode(), calc.decimales())?;
    stdout.flush()?;

    for ligne in stdin.lock().lines() {
        let ligne = ligne?;
        let ligne = ligne.trim();
        if !ligne.is_empty() {
            match analyser(ligne) {
                Ok(Commande::Quitter) => break,
                Ok(cmd) => {
                    for l in executer(&mut calc, cmd) {
                        writeln!(stdout, "{l}")?;
                    }
                }
                Err(e) => writeln!(stdout, "{e}")?,
            }
        }
        write!(stdout, "> ")?;
        stdout.flush()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lancer(calc: &mut Calculatrice, ligne: &str) -> Vec<String> {
        executer(calc, analyser(ligne).unwrap())
    }

    #[test]
    fn commandes_de_base() {
        let mut c = Calculatrice::default();
        assert_eq!(lancer(&mut c, "2×3+4"), vec!["10"]);
        assert_eq!(lancer(&mut c, ":fix 2"), vec!["DEG | FIX 2"]);
        assert_eq!(lancer(&mut c, ":eq quad 1, -3, 2"), vec!["x₁ = 2; x₂ = 1"]);
        assert_eq!(lancer(&mut c, ":eq lin , 5"), vec!["aucune solution"]);
        assert!(matches!(analyser(":zz"), Err(ErreurCommande::Inconnue(_))));
        assert!(matches!(analyser(":dim A 2"), Err(ErreurCommande::ArgumentManquant("dim"))));
    }

    #[test]
    fn commandes_matrices() {
        let mut c = Calculatrice::default();
        assert_eq!(lancer(&mut c, ":mat A 1 2; 3 4"), vec!["[1, 2]", "[3, 4]"]);
        assert_eq!(lancer(&mut c, ":det A"), vec!["det(A) = -2"]);
        assert_eq!(lancer(&mut c, ":trans A"), vec!["Aᵀ =", "[1, 3]", "[2, 4]"]);
        assert_eq!(lancer(&mut c, ":dim A 1 3"), vec!["[1, 2, 0]"]);
        assert!(lancer(&mut c, ":det A")[0].contains("Error"));

        // NaN / inf refusés, A inchangée
        assert!(lancer(&mut c, ":mat A nan 1; 2 3")[0].contains("Error"));
        assert!(lancer(&mut c, ":mat A 1 inf; 2 3")[0].contains("Error"));
        assert_eq!(lancer(&mut c, ":show A"), vec!["[1, 2, 0]"]);
    }
}
