//! Session de calcul : Ans, mémoires, historique.
//!
//! Contrats :
//! - La session est un objet explicite (pas d’état global) : plusieurs sessions
//!   indépendantes peuvent coexister (tests en parallèle).
//! - Ans et l’historique ne changent qu’après un calcul entièrement réussi (`consigner`).
//! - Historique borné, éviction FIFO (la plus ancienne entrée sort en premier).

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use num_complex::Complex64;

/// Taille maximale de l’historique.
pub const HISTORIQUE_MAX: usize = 50;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EntreeHistorique {
    pub expression: String,
    pub resultat: String,
}

/// Journal borné (FIFO), en ordre d’insertion.
#[derive(Clone, Debug)]
pub struct Historique {
    entrees: VecDeque<EntreeHistorique>,
    capacite: usize,
}

impl Default for Historique {
    fn default() -> Self {
        Self::avec_capacite(HISTORIQUE_MAX)
    }
}

impl Historique {
    pub fn avec_capacite(capacite: usize) -> Self {
        Self {
            entrees: VecDeque::with_capacity(capacite.min(HISTORIQUE_MAX)),
            capacite: capacite.max(1),
        }
    }

    pub fn ajouter(&mut self, expression: impl Into<String>, resultat: impl Into<String>) {
        self.entrees.push_back(EntreeHistorique {
            expression: expression.into(),
            resultat: resultat.into(),
        });
        while self.entrees.len() > self.capacite {
            self.entrees.pop_front();
        }
    }

    /// Entrées de la plus ancienne à la plus récente.
    pub fn entrees(&self) -> impl DoubleEndedIterator<Item = &EntreeHistorique> + '_ {
        self.entrees.iter()
    }

    pub fn vider(&mut self) {
        self.entrees.clear();
    }

    pub fn len(&self) -> usize {
        self.entrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entrees.is_empty()
    }

    pub fn capacite(&self) -> usize {
        self.capacite
    }
}

/// Registres mémoire : variables A–F + mémoire indépendante M (M+, M−).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Registre {
    A,
    B,
    C,
    D,
    E,
    F,
    M,
}

impl Registre {
    pub const TOUS: [Registre; 7] = [
        Registre::A,
        Registre::B,
        Registre::C,
        Registre::D,
        Registre::E,
        Registre::F,
        Registre::M,
    ];

    fn index(self) -> usize {
        self as usize
    }

    pub fn lettre(self) -> char {
        ['A', 'B', 'C', 'D', 'E', 'F', 'M'][self.index()]
    }
}

impl fmt::Display for Registre {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.lettre())
    }
}

impl FromStr for Registre {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let t = s.trim();
        Registre::TOUS
            .into_iter()
            .find(|r| t.eq_ignore_ascii_case(&r.lettre().to_string()))
            .ok_or_else(|| format!("registre inconnu : {t}"))
    }
}

/// Banque de mémoires, toutes initialisées à 0.
#[derive(Clone, Debug, Default)]
pub struct Memoire {
    valeurs: [Complex64; 7],
}

impl Memoire {
    pub fn lire(&self, r: Registre) -> Complex64 {
        self.valeurs[r.index()]
    }

    pub fn stocker(&mut self, r: Registre, v: Complex64) {
        self.valeurs[r.index()] = v;
    }

    /// M+ (ou accumulation dans n’importe quel registre).
    pub fn ajouter(&mut self, r: Registre, v: Complex64) {
        self.valeurs[r.index()] += v;
    }

    /// M−.
    pub fn soustraire(&mut self, r: Registre, v: Complex64) {
        self.valeurs[r.index()] -= v;
    }

    /// MC : remet tous les registres à 0.
    pub fn effacer(&mut self) {
        self.valeurs = [Complex64::default(); 7];
    }
}

#[derive(Clone, Debug)]
pub struct Session {
    ans: Complex64,
    memoire: Memoire,
    historique: Historique,
    historique_actif: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self {
            ans: Complex64::new(0.0, 0.0),
            memoire: Memoire::default(),
            historique: Historique::default(),
            historique_actif: true,
        }
    }
}

impl Session {
    pub fn ans(&self) -> Complex64 {
        self.ans
    }

    pub fn memoire(&self) -> &Memoire {
        &self.memoire
    }

    pub fn memoire_mut(&mut self) -> &mut Memoire {
        &mut self.memoire
    }

    pub fn historique(&self) -> &Historique {
        &self.historique
    }

    pub fn vider_historique(&mut self) {
        self.historique.vider();
    }

    pub fn historique_actif(&self) -> bool {
        self.historique_actif
    }

    pub fn set_historique_actif(&mut self, actif: bool) {
        self.historique_actif = actif;
    }

    /// Commit d’un calcul réussi : Ans (si valeur numérique) puis historique (si actif).
    /// Seul point d’écriture de Ans : un échec ne passe jamais par ici.
    pub fn consigner(&mut self, valeur: Option<Complex64>, expression: &str, resultat: &str) {
        if let Some(v) = valeur {
            self.ans = v;
        }
        if self.historique_actif {
            self.historique.ajouter(expression, resultat);
        }
    }
}
