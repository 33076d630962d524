//! Landing page route handler.
//!
//! The landing page is fixed marketing content; it only varies with whether
//! a visitor is signed in.

use askama::Template;
use askama_web::WebTemplate;
use axum::response::IntoResponse;
use tracing::instrument;

use crate::filters;
use crate::middleware::OptionalAuth;

// =============================================================================
// Content Types
// =============================================================================

/// A reason to order, shown as a card under the hero.
pub struct SellingPoint {
    pub icon: &'static str,
    pub title: &'static str,
    pub description: &'static str,
}

/// A featured partner restaurant.
pub struct PartnerRestaurant {
    pub icon: &'static str,
    pub name: &'static str,
    /// Star rating out of five.
    pub rating: u8,
    pub review_count: u32,
    pub tagline: &'static str,
}

/// A numbered step of the ordering walkthrough.
pub struct Step {
    pub number: u8,
    pub title: &'static str,
    pub description: &'static str,
}

/// A customer quote.
pub struct Testimonial {
    pub rating: u8,
    pub quote: &'static str,
    pub author: &'static str,
}

/// A reassurance shown in the footer band.
pub struct TrustSignal {
    pub icon: &'static str,
    pub label: &'static str,
}

// =============================================================================
// Content
// =============================================================================

pub static SELLING_POINTS: [SellingPoint; 4] = [
    SellingPoint {
        icon: "🚀",
        title: "Livraison ultra-rapide",
        description: "Vos plats chauds et savoureux livrés en moins de 30 minutes, directement à votre porte.",
    },
    SellingPoint {
        icon: "🍽️",
        title: "Choix gourmand",
        description: "Plus de 200 restaurants partenaires pour satisfaire toutes vos envies, des classiques aux découvertes.",
    },
    SellingPoint {
        icon: "💰",
        title: "Offres exclusives",
        description: "Des promotions quotidiennes et un programme de fidélité qui récompense chaque commande.",
    },
    SellingPoint {
        icon: "🌿",
        title: "Options pour tous",
        description: "Large sélection de menus végétariens, végans, sans gluten et adaptés à tous les régimes alimentaires.",
    },
];

pub static PARTNER_RESTAURANTS: [PartnerRestaurant; 4] = [
    PartnerRestaurant {
        icon: "🍕",
        name: "Pizzeria Napoli",
        rating: 5,
        review_count: 342,
        tagline: "Les meilleures pizzas de la ville, livrées encore fumantes !",
    },
    PartnerRestaurant {
        icon: "🍣",
        name: "Sushi Master",
        rating: 5,
        review_count: 187,
        tagline: "Fraîcheur et saveurs authentiques à chaque bouchée.",
    },
    PartnerRestaurant {
        icon: "🍔",
        name: "Burger Gourmet",
        rating: 5,
        review_count: 256,
        tagline: "Des burgers juteux qui vous feront saliver d'envie !",
    },
    PartnerRestaurant {
        icon: "🥗",
        name: "Green & Fresh",
        rating: 5,
        review_count: 129,
        tagline: "Des salades créatives et des bowls nutritifs pour se faire plaisir.",
    },
];

pub static STEPS: [Step; 3] = [
    Step {
        number: 1,
        title: "Entrez votre adresse",
        description: "Indiquez où vous souhaitez être livré pour découvrir tous les restaurants disponibles près de chez vous.",
    },
    Step {
        number: 2,
        title: "Choisissez vos plats",
        description: "Parcourez les menus, lisez les avis et composez votre festin idéal en quelques clics.",
    },
    Step {
        number: 3,
        title: "Savourez",
        description: "Suivez votre commande en temps réel et préparez-vous à déguster des plats délicieux sans bouger de chez vous.",
    },
];

pub static TESTIMONIALS: [Testimonial; 3] = [
    Testimonial {
        rating: 5,
        quote: "Commande livrée en 22 minutes chrono ! Les plats étaient encore chauds et délicieux. Service impeccable !",
        author: "Marie L.",
    },
    Testimonial {
        rating: 5,
        quote: "J'adore la variété des restaurants disponibles. Parfait quand toute la famille veut manger différemment.",
        author: "Thomas D.",
    },
    Testimonial {
        rating: 5,
        quote: "Les offres exclusives sont géniales ! J'ai économisé plus de 50€ le mois dernier grâce aux promotions.",
        author: "Sophie M.",
    },
];

pub static TRUST_SIGNALS: [TrustSignal; 3] = [
    TrustSignal {
        icon: "🔒",
        label: "Paiement 100% sécurisé",
    },
    TrustSignal {
        icon: "⏱️",
        label: "Livraison garantie en 30 min ou remboursée",
    },
    TrustSignal {
        icon: "💬",
        label: "Support client 7j/7",
    },
];

// =============================================================================
// Template
// =============================================================================

/// Landing page template.
#[derive(Template, WebTemplate)]
#[template(path = "home.html")]
pub struct HomeTemplate {
    pub signed_in: bool,
    pub selling_points: &'static [SellingPoint],
    pub restaurants: &'static [PartnerRestaurant],
    pub steps: &'static [Step],
    pub testimonials: &'static [Testimonial],
    pub trust_signals: &'static [TrustSignal],
}

/// Display the landing page.
#[instrument(skip_all)]
pub async fn home(OptionalAuth(account): OptionalAuth) -> impl IntoResponse {
    HomeTemplate {
        signed_in: account.is_some(),
        selling_points: &SELLING_POINTS,
        restaurants: &PARTNER_RESTAURANTS,
        steps: &STEPS,
        testimonials: &TESTIMONIALS,
        trust_signals: &TRUST_SIGNALS,
    }
}
